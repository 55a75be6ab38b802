//! Static surah reference data.

pub const SURAH_COUNT: u16 = 114;
pub const TOTAL_VERSES: u32 = 6236;
pub const PAGE_COUNT: u16 = 604;

const VERSE_COUNTS: [u16; SURAH_COUNT as usize] = [
    7, 286, 200, 176, 120, 165, 206, 75, 129, 109, 123, 111, 43, 52, 99, 128, 111, 110, 98, 135,
    112, 78, 118, 64, 77, 227, 93, 88, 69, 60, 34, 30, 73, 54, 45, 83, 182, 88, 75, 85, 54, 53,
    89, 59, 37, 35, 38, 29, 18, 45, 60, 49, 62, 55, 78, 96, 29, 22, 24, 13, 14, 11, 11, 18, 12,
    12, 30, 52, 52, 44, 28, 28, 20, 56, 40, 31, 50, 40, 46, 42, 29, 19, 36, 25, 22, 17, 19, 26,
    30, 20, 15, 21, 11, 8, 8, 19, 5, 8, 8, 11, 11, 8, 3, 9, 5, 4, 7, 3, 6, 3, 5, 4, 5, 6,
];

const LOCALIZED_NAMES: [&str; SURAH_COUNT as usize] = [
    "Fatiha", "Bakara", "Al-i İmran", "Nisa", "Maide", "En'am", "A'raf", "Enfal", "Tevbe",
    "Yunus", "Hud", "Yusuf", "Rad", "İbrahim", "Hicr", "Nahl", "İsra", "Kehf", "Meryem", "Taha",
    "Enbiya", "Hac", "Müminun", "Nur", "Furkan", "Şuara", "Neml", "Kasas", "Ankebut", "Rum",
    "Lokman", "Secde", "Ahzab", "Sebe", "Fatır", "Yasin", "Saffat", "Sad", "Zümer", "Mümin",
    "Fussilet", "Şura", "Zuhruf", "Duhan", "Casiye", "Ahkaf", "Muhammed", "Fetih", "Hucurat",
    "Kaf", "Zariyat", "Tur", "Necm", "Kamer", "Rahman", "Vakıa", "Hadid", "Mücadele", "Haşr",
    "Mümtehine", "Saff", "Cuma", "Münafikun", "Tegabun", "Talak", "Tahrim", "Mülk", "Kalem",
    "Hakka", "Mearic", "Nuh", "Cin", "Müzzemmil", "Müddessir", "Kıyame", "İnsan", "Mürselat",
    "Nebe", "Naziat", "Abese", "Tekvir", "İnfitar", "Mutaffifin", "İnşikak", "Buruc", "Tarık",
    "A'la", "Gaşiye", "Fecr", "Beled", "Şems", "Leyl", "Duha", "İnşirah", "Tin", "Alak", "Kadir",
    "Beyyine", "Zilzal", "Adiyat", "Karia", "Tekasür", "Asr", "Hümeze", "Fil", "Kureyş", "Maun",
    "Kevser", "Kafirun", "Nasr", "Tebbet", "İhlas", "Felak", "Nas",
];

fn slot(number: u16) -> Option<usize> {
    if (1..=SURAH_COUNT).contains(&number) {
        Some(number as usize - 1)
    } else {
        None
    }
}

pub fn verse_count(number: u16) -> Option<u16> {
    slot(number).map(|i| VERSE_COUNTS[i])
}

pub fn surah_name(number: u16) -> Option<&'static str> {
    slot(number).map(|i| LOCALIZED_NAMES[i])
}

/// Localized name with a generic fallback for numbers outside the table.
pub fn display_name(number: u16) -> String {
    surah_name(number)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Surah {number}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_cover_the_whole_mushaf() {
        let total: u32 = VERSE_COUNTS.iter().map(|&c| c as u32).sum();
        assert_eq!(total, TOTAL_VERSES);
        assert_eq!(verse_count(1), Some(7));
        assert_eq!(verse_count(2), Some(286));
        assert_eq!(verse_count(114), Some(6));
        assert_eq!(verse_count(0), None);
        assert_eq!(verse_count(115), None);
    }

    #[test]
    fn names_fall_back_outside_range() {
        assert_eq!(surah_name(1), Some("Fatiha"));
        assert_eq!(surah_name(114), Some("Nas"));
        assert_eq!(display_name(36), "Yasin");
        assert_eq!(display_name(0), "Surah 0");
    }
}
