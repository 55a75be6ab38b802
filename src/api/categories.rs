use super::models::VerseRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub icon: &'static str,
    pub verses: &'static [VerseRef],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: "Sabır",
        icon: "⏳",
        verses: &[VerseRef::new(2, 153), VerseRef::new(2, 155), VerseRef::new(3, 200)],
    },
    Category {
        name: "Şükür",
        icon: "🙏",
        verses: &[VerseRef::new(2, 152), VerseRef::new(14, 7), VerseRef::new(31, 12)],
    },
    Category {
        name: "Dua",
        icon: "🤲",
        verses: &[VerseRef::new(2, 186), VerseRef::new(40, 60), VerseRef::new(25, 77)],
    },
    Category {
        name: "Merhamet",
        icon: "💚",
        verses: &[VerseRef::new(7, 156), VerseRef::new(21, 107), VerseRef::new(27, 77)],
    },
    Category {
        name: "Adalet",
        icon: "⚖️",
        verses: &[VerseRef::new(4, 135), VerseRef::new(5, 8), VerseRef::new(57, 25)],
    },
    Category {
        name: "İlim",
        icon: "📖",
        verses: &[VerseRef::new(20, 114), VerseRef::new(39, 9), VerseRef::new(58, 11)],
    },
];

pub fn find_category(name: &str) -> Option<&'static Category> {
    let name = name.trim();
    CATEGORIES.iter().find(|c| c.name == name)
}

pub fn category_references(name: &str) -> &'static [VerseRef] {
    find_category(name).map(|c| c.verses).unwrap_or(&[])
}
