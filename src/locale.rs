use serde::{Deserialize, Serialize};

use crate::models::Status;

const MONTHS_EN: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const MONTHS_PT: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Language of every fixed string on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Locale {
    #[default]
    En,
    PtBr,
}

impl Locale {
    /// `month0` is zero based, as returned by `Datelike::month0`.
    pub fn month_abbrev(self, month0: u32) -> &'static str {
        let months = match self {
            Locale::En => &MONTHS_EN,
            Locale::PtBr => &MONTHS_PT,
        };
        months.get(month0 as usize).copied().unwrap_or("--")
    }

    pub fn status_label(self, status: Status) -> &'static str {
        match (self, status) {
            (Locale::En, Status::Ok) => "Confirmed",
            (Locale::En, Status::Warn) => "Registration open",
            (Locale::En, Status::Bad) => "Cancelled",
            (Locale::PtBr, Status::Ok) => "Confirmado",
            (Locale::PtBr, Status::Warn) => "Inscrições",
            (Locale::PtBr, Status::Bad) => "Cancelado",
        }
    }

    pub fn ticket_label(self) -> &'static str {
        match self {
            Locale::En => "Tickets/Registration",
            Locale::PtBr => "Ingressos/Inscrição",
        }
    }

    pub fn poster_alt(self, title: &str) -> String {
        match self {
            Locale::En => format!("Poster for event {title}"),
            Locale::PtBr => format!("Cartaz do evento {title}"),
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Locale::En => "No upcoming events match your filters.",
            Locale::PtBr => "Nenhum evento encontrado.",
        }
    }

    pub fn load_error_message(self) -> &'static str {
        match self {
            Locale::En => "Could not load events right now.",
            Locale::PtBr => "Não foi possível carregar os eventos agora.",
        }
    }

    pub fn page_title(self) -> &'static str {
        match self {
            Locale::En => "Upcoming events",
            Locale::PtBr => "Agenda de eventos",
        }
    }

    pub fn type_placeholder(self) -> &'static str {
        match self {
            Locale::En => "Type",
            Locale::PtBr => "Tipo",
        }
    }

    pub fn venue_placeholder(self) -> &'static str {
        match self {
            Locale::En => "Venue",
            Locale::PtBr => "Local",
        }
    }

    pub fn search_placeholder(self) -> &'static str {
        match self {
            Locale::En => "Search title, artists or venue",
            Locale::PtBr => "Buscar por título, artistas ou local",
        }
    }

    pub fn filter_label(self) -> &'static str {
        match self {
            Locale::En => "Filter",
            Locale::PtBr => "Filtrar",
        }
    }

    pub fn html_lang(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_labels_follow_locale() {
        assert_eq!(Locale::En.month_abbrev(11), "dec");
        assert_eq!(Locale::PtBr.month_abbrev(11), "dez");
        assert_eq!(Locale::En.month_abbrev(12), "--");
    }

    #[test]
    fn locale_names_in_config() {
        let locale: Locale = serde_json::from_str("\"pt-br\"").expect("decode locale");
        assert_eq!(locale, Locale::PtBr);
    }
}
