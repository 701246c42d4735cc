use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workspace_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceType {
    Hairdresser,
    Makeup,
    Manicure,
    Cosmetology,
    Massage,
}

impl WorkspaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceType::Hairdresser => "hairdresser",
            WorkspaceType::Makeup => "makeup",
            WorkspaceType::Manicure => "manicure",
            WorkspaceType::Cosmetology => "cosmetology",
            WorkspaceType::Massage => "massage",
        }
    }
}

/// Рабочее место в коворкинге. Цены в целых рублях.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: WorkspaceType,
    pub price_per_hour: i64,
    pub price_per_day: i64,
    pub image_url: Option<String>,
    pub amenities: Vec<String>,
    pub is_available: bool,
    /// Средний рейтинг в десятых долях (45 = 4.5).
    #[serde(rename = "rating", serialize_with = "tenths_as_decimal")]
    pub rating_tenths: i32,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    pub fn matches(&self, filter: &WorkspaceFilter) -> bool {
        if let Some(kind) = filter.kind {
            if self.kind != kind {
                return false;
            }
        }
        match filter.search_term() {
            Some(term) => {
                self.name.to_lowercase().contains(&term)
                    || self
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

fn tenths_as_decimal<S: Serializer>(tenths: &i32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(f64::from(*tenths) / 10.0)
}

// Строка из БД: amenities хранятся как JSON-массив в текстовой колонке
#[derive(Debug, Clone, FromRow)]
pub struct WorkspaceRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: WorkspaceType,
    pub price_per_hour: i64,
    pub price_per_day: i64,
    pub image_url: Option<String>,
    pub amenities: Option<String>,
    pub is_available: bool,
    pub rating_tenths: i32,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkspaceRow> for Workspace {
    fn from(row: WorkspaceRow) -> Self {
        Workspace {
            amenities: parse_amenities(row.id, row.amenities.as_deref()),
            id: row.id,
            name: row.name,
            description: row.description,
            kind: row.kind,
            price_per_hour: row.price_per_hour,
            price_per_day: row.price_per_day,
            image_url: row.image_url,
            is_available: row.is_available,
            rating_tenths: row.rating_tenths,
            review_count: row.review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub fn parse_amenities(workspace_id: i64, raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("workspace {} has malformed amenities: {}", workspace_id, e);
            Vec::new()
        }
    }
}

/// Фильтр каталога: тип места и поиск по названию/описанию.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceFilter {
    #[serde(rename = "type")]
    pub kind: Option<WorkspaceType>,
    pub search: Option<String>,
}

impl WorkspaceFilter {
    /// Поисковая строка в нижнем регистре, пустая строка = без фильтра.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}
