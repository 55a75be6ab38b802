// alquran.cloud response model types used by the content client.
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::error::{ApiError, Result};
use crate::api::models::{Sajda, SurahInfo, Verse, VerseRef};

#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Unwraps `data` for a 200 envelope, otherwise reports the API's own status.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T> {
        if self.code != 200 {
            let status = match self.data {
                serde_json::Value::String(message) if !message.is_empty() => message,
                _ => self.status,
            };
            return Err(ApiError::Remote {
                code: self.code,
                status,
            });
        }
        serde_json::from_value(self.data).map_err(ApiError::from)
    }
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_str(body)?;
    envelope.into_data()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSurahMeta {
    pub number: u16,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: Option<String>,
    #[serde(default)]
    pub revelation_type: Option<String>,
    #[serde(default)]
    pub number_of_ayahs: Option<u16>,
}

impl RawSurahMeta {
    pub fn into_info(self) -> SurahInfo {
        let mut info = SurahInfo::from_remote(self.number, &self.english_name);
        info.english_meaning = self.english_name_translation;
        info.revelation_type = self.revelation_type;
        if self.number_of_ayahs.is_some() {
            info.verse_count = self.number_of_ayahs;
        }
        info
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAyah {
    pub number: u32,
    #[serde(default)]
    pub text: String,
    pub number_in_surah: u16,
    #[serde(default)]
    pub juz: Option<u16>,
    #[serde(default)]
    pub manzil: Option<u16>,
    #[serde(default)]
    pub page: Option<u16>,
    #[serde(default)]
    pub ruku: Option<u16>,
    #[serde(default)]
    pub hizb_quarter: Option<u16>,
    #[serde(default)]
    pub sajda: serde_json::Value,
    #[serde(default)]
    pub surah: Option<RawSurahMeta>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default)]
    pub audio_secondary: Vec<String>,
}

impl RawAyah {
    fn sajda(&self) -> Option<Sajda> {
        let object = self.sajda.as_object()?;
        Some(Sajda {
            id: object.get("id").and_then(|v| v.as_u64()).unwrap_or(0) as u16,
            recommended: object
                .get("recommended")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            obligatory: object
                .get("obligatory")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }

    /// Builds a verse record, taking surah metadata from the ayah itself when
    /// present and from `surah` otherwise.
    pub fn into_verse(self, translation: String, surah: Option<&SurahInfo>) -> Result<Verse> {
        let sajda = self.sajda();
        let info = match (self.surah, surah) {
            (Some(meta), _) => meta.into_info(),
            (None, Some(info)) => info.clone(),
            (None, None) => {
                return Err(ApiError::Malformed(format!(
                    "ayah {} has no surah metadata",
                    self.number
                )))
            }
        };
        Ok(Verse {
            number: self.number,
            reference: VerseRef::new(info.number, self.number_in_surah),
            text: self.text,
            translation,
            surah: info,
            juz: self.juz,
            manzil: self.manzil,
            page: self.page,
            ruku: self.ruku,
            hizb_quarter: self.hizb_quarter,
            sajda,
        })
    }

    pub fn audio_locator(&self) -> Option<String> {
        self.audio
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.audio_secondary.first().cloned())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSurah {
    pub number: u16,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: Option<String>,
    #[serde(default)]
    pub revelation_type: Option<String>,
    #[serde(default)]
    pub number_of_ayahs: Option<u16>,
    #[serde(default)]
    pub ayahs: Vec<RawAyah>,
}

impl RawSurah {
    pub fn info(&self) -> SurahInfo {
        RawSurahMeta {
            number: self.number,
            english_name: self.english_name.clone(),
            english_name_translation: self.english_name_translation.clone(),
            revelation_type: self.revelation_type.clone(),
            number_of_ayahs: self.number_of_ayahs,
        }
        .into_info()
    }
}

#[derive(Debug, Deserialize)]
pub struct RawPage {
    pub number: u16,
    #[serde(default)]
    pub ayahs: Vec<RawAyah>,
}

#[derive(Debug, Deserialize)]
pub struct RawSearch {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub matches: Vec<RawAyah>,
}
