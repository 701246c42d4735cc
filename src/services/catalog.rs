use crate::error::AppError;
use crate::models::{Workspace, WorkspaceFilter};
use crate::repository::Repository;
use crate::services::sql_logger::QueryLog;

pub async fn list_workspaces(
    repo: &Repository,
    filter: WorkspaceFilter,
) -> Result<Vec<Workspace>, AppError> {
    let log = QueryLog::new("workspaces.getAll", describe_listing(&filter))
        .params(&serde_json::json!({
            "type": filter.kind,
            "search": filter.search_term(),
        }));
    repo.read(log, move |s| async move { s.list_workspaces(&filter).await })
        .await
}

pub async fn get_workspace(repo: &Repository, id: i64) -> Result<Option<Workspace>, AppError> {
    let log = QueryLog::new(
        "workspaces.getById",
        format!("SELECT * FROM workspaces WHERE id = {} LIMIT 1", id),
    )
    .params(&serde_json::json!({ "id": id }));
    repo.read(log, move |s| async move { s.find_workspace(id).await })
        .await
}

// Текст запроса для журнала: с теми условиями, которые реально применены
fn describe_listing(filter: &WorkspaceFilter) -> String {
    let mut conditions = Vec::new();
    if let Some(kind) = filter.kind {
        conditions.push(format!("type = '{}'", kind.as_str()));
    }
    if let Some(term) = filter.search_term() {
        conditions.push(format!(
            "(name ILIKE '%{0}%' OR description ILIKE '%{0}%')",
            term
        ));
    }

    let mut query = String::from("SELECT * FROM workspaces");
    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(" ORDER BY rating DESC");
    query
}
