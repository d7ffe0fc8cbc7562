use crate::error::EntryError;
use crate::media::{
    apply_media_fields, normalize_images, normalize_links, value_text, NewsLink, Record,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag given to new entries when the user leaves it blank.
pub const DEFAULT_TAG: &str = "ข่าว/ประกาศ";

const TEXT_FIELDS: [&str; 6] = ["title", "date", "tag", "by", "summary", "body"];
const MEDIA_FIELDS: [&str; 5] = ["images", "image", "links", "link", "linkLabel"];

/// One news item. Only the list form of the media fields is held here; the
/// singular `image`, `link` and `linkLabel` keys are derived when the entry
/// is written out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Record", into = "Record")]
pub struct NewsEntry {
    pub title: String,
    pub date: String,
    pub tag: String,
    pub by: String,
    pub summary: String,
    pub body: String,
    pub images: Vec<String>,
    pub links: Vec<NewsLink>,
    /// Keys this editor does not know about, kept as found.
    pub extra: Record,
}

impl NewsEntry {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }

    pub fn display_date(&self) -> &str {
        if self.date.is_empty() {
            "-"
        } else {
            &self.date
        }
    }
}

impl From<Record> for NewsEntry {
    fn from(mut record: Record) -> Self {
        let images = normalize_images(&record);
        let links = normalize_links(&record);
        let [title, date, tag, by, summary, body] =
            TEXT_FIELDS.map(|key| value_text(record.get(key)));
        for key in TEXT_FIELDS.iter().chain(MEDIA_FIELDS.iter()) {
            record.shift_remove(*key);
        }

        NewsEntry {
            title,
            date,
            tag,
            by,
            summary,
            body,
            images,
            links,
            extra: record,
        }
    }
}

impl From<NewsEntry> for Record {
    fn from(entry: NewsEntry) -> Self {
        let mut record = Record::new();
        let NewsEntry {
            title,
            date,
            tag,
            by,
            summary,
            body,
            images,
            links,
            extra,
        } = entry;

        for (key, value) in TEXT_FIELDS.into_iter().zip([title, date, tag, by, summary, body]) {
            record.insert(key.to_string(), Value::String(value));
        }
        apply_media_fields(&mut record, &images, &links);
        for (key, value) in extra {
            record.entry(key).or_insert(value);
        }
        record
    }
}

/// User-editable form of an entry, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub title: String,
    pub date: String,
    pub tag: String,
    pub by: String,
    pub summary: String,
    pub body: String,
    pub images: Vec<String>,
    pub links: Vec<NewsLink>,
}

impl EntryDraft {
    pub fn from_entry(entry: &NewsEntry) -> Self {
        EntryDraft {
            title: entry.title.clone(),
            date: entry.date.clone(),
            tag: entry.tag.clone(),
            by: entry.by.clone(),
            summary: entry.summary.clone(),
            body: entry.body.clone(),
            images: entry.images.clone(),
            links: entry.links.clone(),
        }
    }

    /// Trims every field and rejects drafts missing a title, date or body.
    pub fn validate(self) -> Result<NewsEntry, EntryError> {
        let title = self.title.trim().to_string();
        let date = self.date.trim().to_string();
        let body = self.body.trim().to_string();

        let missing: Vec<&'static str> = [("title", &title), ("date", &date), ("body", &body)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(EntryError::MissingFields(missing));
        }

        let images = self
            .images
            .iter()
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect();
        let links = self
            .links
            .iter()
            .filter(|link| !link.url.trim().is_empty())
            .map(|link| NewsLink::new(link.label.trim(), link.url.trim()))
            .collect();

        Ok(NewsEntry {
            title,
            date,
            tag: self.tag.trim().to_string(),
            by: self.by.trim().to_string(),
            summary: self.summary.trim().to_string(),
            body,
            images,
            links,
            extra: Record::new(),
        })
    }
}
