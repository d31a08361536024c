//! Arabic / Latin script detection for bilingual lookups.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Ar,
    En,
}

impl Script {
    /// Arabic when Arabic letters outnumber Latin ones, English otherwise.
    pub fn detect(text: &str) -> Self {
        let (arabic, latin) = text.chars().fold((0usize, 0usize), |(a, l), c| {
            if ('\u{0600}'..='\u{06FF}').contains(&c) {
                (a + 1, l)
            } else if c.is_ascii_alphabetic() {
                (a, l + 1)
            } else {
                (a, l)
            }
        });
        if arabic > latin {
            Self::Ar
        } else {
            Self::En
        }
    }

    /// Column holding names in this script.
    pub fn name_column(&self) -> &'static str {
        match self {
            Self::Ar => "ar_name",
            Self::En => "en_name",
        }
    }
}
