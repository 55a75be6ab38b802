use crate::api::categories::category_references;
use crate::api::error::{ApiError, Result};
use crate::api::models::*;
use crate::api::surahs::PAGE_COUNT;
use futures_util::future::{try_join, try_join_all};
use once_cell::sync::Lazy;

mod response_models;

use response_models::{decode, Envelope, RawAyah, RawPage, RawSearch, RawSurah, RawSurahMeta};

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub const QURAN_API_BASE: &str = "https://api.alquran.cloud/v1";
pub const SCRIPT_EDITION: &str = "quran-uthmani";
pub const TRANSLATION_EDITION: &str = "tr.diyanet";
pub const RECITATION_EDITION: &str = "ar.alafasy";

/// Edition identifiers used to pick text and audio variants.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Editions {
    pub script: String,
    pub translation: String,
    pub recitation: String,
}

impl Default for Editions {
    fn default() -> Self {
        Self {
            script: SCRIPT_EDITION.to_string(),
            translation: TRANSLATION_EDITION.to_string(),
            recitation: RECITATION_EDITION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuranClient {
    base_url: String,
    editions: Editions,
}

impl Default for QuranClient {
    fn default() -> Self {
        Self::new(Editions::default())
    }
}

impl QuranClient {
    pub fn new(editions: Editions) -> Self {
        Self {
            base_url: QURAN_API_BASE.to_string(),
            editions,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn editions(&self) -> &Editions {
        &self.editions
    }

    fn build_url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    async fn fetch_body(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "content request");
        let response = HTTP_CLIENT.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // The API answers misses with a JSON envelope and a 4xx status; keep
        // the envelope so callers see its message.
        if !status.is_success() && serde_json::from_str::<Envelope>(&body).is_err() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(body)
    }

    async fn fetch_pair(&self, kind: &str, id: &str) -> Result<(String, String)> {
        let script_url = self.build_url(&[kind, id, self.editions.script.as_str()]);
        let translation_url = self.build_url(&[kind, id, self.editions.translation.as_str()]);
        try_join(
            self.fetch_body(&script_url),
            self.fetch_body(&translation_url),
        )
        .await
    }

    pub async fn list_surahs(&self) -> Result<Vec<SurahInfo>> {
        let body = self.fetch_body(&self.build_url(&["surah"])).await?;
        parse_surah_list(&body)
    }

    pub async fn get_surah(&self, number: u16) -> Result<Surah> {
        if !VerseRef::new(number, 1).is_valid() {
            return Err(ApiError::InvalidReference(format!("surah {number}")));
        }
        let (script, translation) = self.fetch_pair("surah", &number.to_string()).await?;
        parse_surah_pair(&script, &translation)
    }

    pub async fn get_verse(&self, reference: VerseRef) -> Result<Verse> {
        if !reference.is_valid() {
            return Err(ApiError::InvalidReference(reference.to_string()));
        }
        let (script, translation) = self.fetch_pair("ayah", &reference.to_string()).await?;
        parse_verse_pair(&script, &translation)
    }

    pub async fn get_page(&self, number: u16) -> Result<QuranPage> {
        if !(1..=PAGE_COUNT).contains(&number) {
            return Err(ApiError::InvalidReference(format!("page {number}")));
        }
        let (script, translation) = self.fetch_pair("page", &number.to_string()).await?;
        parse_page_pair(&script, &translation)
    }

    pub async fn get_audio_url(&self, reference: VerseRef) -> Result<String> {
        if !reference.is_valid() {
            return Err(ApiError::InvalidReference(reference.to_string()));
        }
        let id = reference.to_string();
        let url = self.build_url(&["ayah", id.as_str(), self.editions.recitation.as_str()]);
        let body = self.fetch_body(&url).await?;
        parse_audio_locator(&body)
    }

    /// Keyword search over the translation edition. No matches is an empty list.
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchMatch>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let encoded = urlencoding::encode(keyword);
        let url = self.build_url(&[
            "search",
            encoded.as_ref(),
            "all",
            self.editions.translation.as_str(),
        ]);
        let body = self.fetch_body(&url).await?;
        parse_search(&body)
    }

    pub async fn category_verses(&self, category: &str) -> Result<Vec<Verse>> {
        let references = category_references(category);
        if references.is_empty() {
            return Ok(Vec::new());
        }
        try_join_all(references.iter().map(|r| self.get_verse(*r))).await
    }
}

fn parse_surah_list(body: &str) -> Result<Vec<SurahInfo>> {
    let surahs: Vec<RawSurahMeta> = decode(body)?;
    Ok(surahs.into_iter().map(RawSurahMeta::into_info).collect())
}

/// Zips script and translation ayahs by position. A missing translation entry
/// becomes an empty string.
fn merge_ayahs(
    script: Vec<RawAyah>,
    translation: Vec<RawAyah>,
    surah: Option<&SurahInfo>,
) -> Result<Vec<Verse>> {
    let mut translations = translation.into_iter();
    script
        .into_iter()
        .map(|ayah| {
            let text = translations.next().map(|t| t.text).unwrap_or_default();
            ayah.into_verse(text, surah)
        })
        .collect()
}

fn parse_surah_pair(script: &str, translation: &str) -> Result<Surah> {
    let script: RawSurah = decode(script)?;
    let translation: RawSurah = decode(translation)?;
    let info = script.info();
    let verses = merge_ayahs(script.ayahs, translation.ayahs, Some(&info))?;
    Ok(Surah { info, verses })
}

fn parse_verse_pair(script: &str, translation: &str) -> Result<Verse> {
    let script: RawAyah = decode(script)?;
    let translation: RawAyah = decode(translation)?;
    script.into_verse(translation.text, None)
}

fn parse_page_pair(script: &str, translation: &str) -> Result<QuranPage> {
    let script: RawPage = decode(script)?;
    let translation: RawPage = decode(translation)?;
    Ok(QuranPage {
        number: script.number,
        verses: merge_ayahs(script.ayahs, translation.ayahs, None)?,
    })
}

fn parse_audio_locator(body: &str) -> Result<String> {
    let ayah: RawAyah = decode(body)?;
    ayah.audio_locator()
        .ok_or_else(|| ApiError::Malformed(format!("no audio for ayah {}", ayah.number)))
}

fn parse_search(body: &str) -> Result<Vec<SearchMatch>> {
    let result: RawSearch = match decode(body) {
        Ok(result) => result,
        Err(ApiError::Remote { code: 404, .. }) => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    tracing::debug!(count = result.count, "search matches");
    result
        .matches
        .into_iter()
        .map(|m| {
            let meta = m
                .surah
                .clone()
                .ok_or_else(|| ApiError::Malformed(format!("match {} has no surah", m.number)))?;
            let info = meta.into_info();
            Ok(SearchMatch {
                reference: VerseRef::new(info.number, m.number_in_surah),
                surah_name: info.localized_name,
                text: m.text,
                number: m.number,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surah_body(text_prefix: &str, ayahs: usize) -> String {
        let ayahs: Vec<String> = (1..=ayahs)
            .map(|i| {
                format!(
                    r#"{{"number":{i},"text":"{text_prefix} {i}","numberInSurah":{i},"juz":1,"manzil":1,"page":1,"ruku":1,"hizbQuarter":1,"sajda":false}}"#
                )
            })
            .collect();
        format!(
            r#"{{"code":200,"status":"OK","data":{{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha","englishNameTranslation":"The Opening","revelationType":"Meccan","numberOfAyahs":7,"ayahs":[{}]}}}}"#,
            ayahs.join(",")
        )
    }

    #[test]
    fn surah_pair_zips_by_position() {
        let surah = parse_surah_pair(&surah_body("ar", 7), &surah_body("tr", 7)).unwrap();
        assert_eq!(surah.info.localized_name, "Fatiha");
        assert_eq!(surah.info.english_meaning.as_deref(), Some("The Opening"));
        assert_eq!(surah.verses.len(), 7);
        assert_eq!(surah.verses[0].reference, VerseRef::new(1, 1));
        assert_eq!(surah.verses[0].text, "ar 1");
        assert_eq!(surah.verses[6].translation, "tr 7");
        assert_eq!(surah.verses[6].reference, VerseRef::new(1, 7));
    }

    #[test]
    fn missing_translation_entry_is_empty() {
        let surah = parse_surah_pair(&surah_body("ar", 7), &surah_body("tr", 5)).unwrap();
        assert_eq!(surah.verses.len(), 7);
        assert_eq!(surah.verses[4].translation, "tr 5");
        assert_eq!(surah.verses[5].translation, "");
        assert_eq!(surah.verses[6].translation, "");
    }

    #[test]
    fn error_code_is_reported() {
        let body = r#"{"code":400,"status":"BAD REQUEST","data":"Surah number should be between 1 and 114"}"#;
        match parse_surah_pair(body, body) {
            Err(ApiError::Remote { code, status }) => {
                assert_eq!(code, 400);
                assert!(status.contains("between 1 and 114"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(
            parse_surah_pair("<html>", "<html>"),
            Err(ApiError::Malformed(_))
        ));
        let wrong_shape = r#"{"code":200,"status":"OK","data":[1,2,3]}"#;
        assert!(matches!(
            parse_surah_pair(wrong_shape, wrong_shape),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn single_verse_takes_reference_from_payload() {
        let script = r#"{"code":200,"status":"OK","data":{"number":262,"text":"ٱللَّهُ لَآ إِلَـٰهَ","numberInSurah":255,"juz":3,"page":42,"sajda":false,"surah":{"number":2,"englishName":"Al-Baqara","numberOfAyahs":286}}}"#;
        let translation = r#"{"code":200,"status":"OK","data":{"number":262,"text":"Allah, O'ndan başka ilah yoktur","numberInSurah":255,"surah":{"number":2,"englishName":"Al-Baqara"}}}"#;
        let verse = parse_verse_pair(script, translation).unwrap();
        assert_eq!(verse.reference, VerseRef::new(2, 255));
        assert_eq!(verse.surah.localized_name, "Bakara");
        assert_eq!(verse.surah.verse_count, Some(286));
        assert_eq!(verse.page, Some(42));
        assert!(verse.translation.starts_with("Allah"));
        assert!(verse.sajda.is_none());
    }

    #[test]
    fn sajda_object_is_kept() {
        let body = r#"{"code":200,"status":"OK","data":{"number":1160,"text":"x","numberInSurah":206,"sajda":{"id":1,"recommended":true,"obligatory":false},"surah":{"number":7,"englishName":"Al-A'raaf"}}}"#;
        let verse = parse_verse_pair(body, body).unwrap();
        assert_eq!(
            verse.sajda,
            Some(Sajda {
                id: 1,
                recommended: true,
                obligatory: false
            })
        );
    }

    #[test]
    fn page_verses_carry_their_own_surah() {
        let body = r#"{"code":200,"status":"OK","data":{"number":1,"ayahs":[
            {"number":1,"text":"a","numberInSurah":1,"surah":{"number":1,"englishName":"Al-Faatiha"}},
            {"number":8,"text":"b","numberInSurah":1,"surah":{"number":2,"englishName":"Al-Baqara"}}
        ]}}"#;
        let page = parse_page_pair(body, body).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.verses[0].reference, VerseRef::new(1, 1));
        assert_eq!(page.verses[1].reference, VerseRef::new(2, 1));
        assert_eq!(page.verses[1].surah.localized_name, "Bakara");
    }

    #[test]
    fn audio_locator_is_extracted() {
        let body = r#"{"code":200,"status":"OK","data":{"number":1,"audio":"https://cdn.islamic.network/quran/audio/128/ar.alafasy/1.mp3","audioSecondary":["https://cdn.islamic.network/quran/audio/64/ar.alafasy/1.mp3"],"text":"x","numberInSurah":1}}"#;
        assert_eq!(
            parse_audio_locator(body).unwrap(),
            "https://cdn.islamic.network/quran/audio/128/ar.alafasy/1.mp3"
        );

        let secondary_only = r#"{"code":200,"status":"OK","data":{"number":1,"audio":"","audioSecondary":["https://x/1.mp3"],"text":"x","numberInSurah":1}}"#;
        assert_eq!(parse_audio_locator(secondary_only).unwrap(), "https://x/1.mp3");

        let silent = r#"{"code":200,"status":"OK","data":{"number":1,"text":"x","numberInSurah":1}}"#;
        assert!(matches!(parse_audio_locator(silent), Err(ApiError::Malformed(_))));
    }

    #[test]
    fn search_without_matches_is_empty() {
        let not_found = r#"{"code":404,"status":"NOT FOUND","data":"Nothing found"}"#;
        assert!(parse_search(not_found).unwrap().is_empty());

        let zero = r#"{"code":200,"status":"OK","data":{"count":0,"matches":[]}}"#;
        assert!(parse_search(zero).unwrap().is_empty());
    }

    #[test]
    fn search_matches_are_normalized() {
        let body = r#"{"code":200,"status":"OK","data":{"count":1,"matches":[
            {"number":160,"text":"sabredenlerle beraberdir","numberInSurah":153,"surah":{"number":2,"englishName":"Al-Baqara"}}
        ]}}"#;
        let matches = parse_search(body).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].reference, VerseRef::new(2, 153));
        assert_eq!(matches[0].surah_name, "Bakara");
    }

    #[test]
    fn surah_list_uses_localized_names() {
        let body = r#"{"code":200,"status":"OK","data":[
            {"number":1,"englishName":"Al-Faatiha","englishNameTranslation":"The Opening","numberOfAyahs":7,"revelationType":"Meccan"},
            {"number":36,"englishName":"Yaseen","numberOfAyahs":83,"revelationType":"Meccan"}
        ]}"#;
        let list = parse_surah_list(body).unwrap();
        assert_eq!(list[0].localized_name, "Fatiha");
        assert_eq!(list[1].localized_name, "Yasin");
        assert_eq!(list[1].verse_count, Some(83));
    }

    #[test]
    fn urls_follow_edition_layout() {
        let client = QuranClient::default().with_base_url("http://localhost:9000/v1/");
        assert_eq!(
            client.build_url(&["ayah", "2:255", "quran-uthmani"]),
            "http://localhost:9000/v1/ayah/2:255/quran-uthmani"
        );
    }

    #[tokio::test]
    async fn out_of_range_references_fail_before_any_request() {
        let client = QuranClient::default().with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            client.get_verse(VerseRef::new(1, 8)).await,
            Err(ApiError::InvalidReference(_))
        ));
        assert!(matches!(
            client.get_surah(115).await,
            Err(ApiError::InvalidReference(_))
        ));
        assert!(matches!(
            client.get_page(605).await,
            Err(ApiError::InvalidReference(_))
        ));
        assert!(client.search("   ").await.unwrap().is_empty());
        assert!(client.category_verses("Unknown").await.unwrap().is_empty());
    }
}
