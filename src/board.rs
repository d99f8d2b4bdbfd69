use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Url;
use tracing::{debug, error, warn};

use crate::config::{AppConfig, ConfigError};
use crate::dates;
use crate::filters::{apply_filters, Control, Filters};
use crate::loader::{LoadError, Loader};
use crate::locale::Locale;
use crate::models::EventRecord;
use crate::render::{render, ListView, Page, RenderContext};
use crate::utils;

/// Placeholder origin for decoding bare query strings.
const QUERY_BASE: &str = "http://board.invalid/";

#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub zone: Tz,
    pub locale: Locale,
    pub fallback_image: String,
}

impl BoardSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            zone: config.zone()?,
            locale: config.locale,
            fallback_image: config.fallback_image.clone(),
        })
    }
}

/// Owns the loaded records and the control values; the only place either
/// changes. Every change recomputes the visible list right away.
pub struct EventBoard {
    settings: BoardSettings,
    records: Vec<EventRecord>,
    filters: Filters,
    view: ListView,
    pinned_today: Option<NaiveDate>,
}

impl EventBoard {
    pub fn new(settings: BoardSettings) -> Self {
        Self {
            settings,
            records: Vec::new(),
            filters: Filters::default(),
            view: ListView::Empty,
            pinned_today: None,
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self.refresh();
        self
    }

    /// Fixes "today" instead of reading the clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self.refresh();
        self
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| dates::today_in(self.settings.zone))
    }

    /// Current filtered, date-ordered sequence.
    pub fn visible(&self) -> Vec<&EventRecord> {
        apply_filters(&self.records, &self.filters, self.today(), self.settings.zone)
    }

    /// Runs one fetch. On failure the previous records are kept and the list
    /// shows the load error instead.
    pub async fn reload(&mut self, loader: &Loader) -> Result<(), LoadError> {
        let result = loader.fetch().await;
        self.apply_load(result)
    }

    pub fn apply_load(
        &mut self,
        result: Result<Vec<EventRecord>, LoadError>,
    ) -> Result<(), LoadError> {
        match result {
            Ok(records) => {
                self.replace_records(records);
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "event load failed");
                self.view = ListView::LoadFailed;
                Err(err)
            }
        }
    }

    pub fn replace_records(&mut self, records: Vec<EventRecord>) {
        self.records = records;
        self.refresh();
    }

    /// Value-change handler for one of the filter inputs.
    pub fn on_input(&mut self, control: Control, value: &str) -> &ListView {
        self.filters.set(control, value);
        self.refresh();
        &self.view
    }

    /// Applies a submitted filter form (`filter-type=show&search=coro`).
    /// Controls missing from the query keep their value; unknown keys are
    /// ignored. The list is recomputed once.
    pub fn apply_query(&mut self, query: &str) -> &ListView {
        let query = query.strip_prefix('?').unwrap_or(query);
        match Url::parse(QUERY_BASE) {
            Ok(mut url) => {
                url.set_query(Some(query));
                for (key, value) in url.query_pairs() {
                    match Control::from_element_id(&key) {
                        Some(control) => self.filters.set(control, value.into_owned()),
                        None => debug!(%key, "ignoring unknown query key"),
                    }
                }
            }
            Err(err) => warn!(error = %err, "could not read filter query"),
        }
        self.refresh();
        &self.view
    }

    fn refresh(&mut self) {
        let ctx = RenderContext {
            zone: self.settings.zone,
            locale: self.settings.locale,
            fallback_image: self.settings.fallback_image.clone(),
            stamp: utils::now_millis(),
        };
        let visible = self.visible();
        debug!(
            total = self.records.len(),
            visible = visible.len(),
            "recomputed event list"
        );
        let view = render(&visible, &ctx);
        self.view = view;
    }

    pub fn page(&self) -> Page<'_> {
        Page {
            year: Utc::now().with_timezone(&self.settings.zone).year(),
            locale: self.settings.locale,
            filters: &self.filters,
            list: &self.view,
        }
    }
}
