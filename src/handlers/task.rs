use axum::{
    extract::{Multipart, State, Path, multipart::Field},
    response::{Html, IntoResponse, Response, Json},
    http::{StatusCode, header},
    body::Body,
    Extension,
};
use std::path::{Path as FilePath, PathBuf};
use chrono::Utc;
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufReader},
};
use tokio_util::io::ReaderStream;
use crate::errors::{AppError, AppResult};
use crate::middleware::Identity;
use crate::models::{NewTask, Task};
use crate::state::AppState;
use crate::views::{escape_html, Page};

pub async fn serve_index(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Html<String>> {
    let tasks = state.tasks.list_tasks().await?;
    tracing::debug!("Listing {} tasks for {}", tasks.len(), identity.username);

    let rows = tasks.iter().map(task_row).collect::<Vec<_>>().join("\n");

    Page::new("index.html")
        .text("username", &identity.username)
        .text("task_count", &tasks.len().to_string())
        .html("tasks", rows)
        .render()
}

fn task_row(task: &Task) -> String {
    format!(
        r#"<tr>
                <td><a href="/task/{}">{}</a></td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
            </tr>"#,
        urlencoding::encode(&task.id),
        escape_html(&task.title),
        task.due_date.format("%Y-%m-%d"),
        file_link(task.file.as_deref()),
        task.created_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

fn file_link(file: Option<&str>) -> String {
    match file {
        Some(name) => format!(
            r#"<a href="/download/{}">{}</a>"#,
            urlencoding::encode(name),
            escape_html(display_name(name)),
        ),
        None => "None".to_string(),
    }
}

/// The client-supplied part of a stored filename.
fn display_name(stored: &str) -> &str {
    stored
        .split_once('-')
        .filter(|(stamp, _)| stamp.chars().all(|c| c.is_ascii_digit()))
        .map(|(_, name)| name)
        .unwrap_or(stored)
}

pub async fn view_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> AppResult<Html<String>> {
    tracing::info!("Viewing task: {}", task_id);

    let task = state
        .tasks
        .get_task(&task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {}", task_id)))?;

    Page::new("task.html")
        .text("title", &task.title)
        .text("description", &task.description)
        .text("due_date", &task.due_date.format("%Y-%m-%d").to_string())
        .text("created_at", &task.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
        .html("file", file_link(task.file.as_deref()))
        .render()
}

// Form data gathered from a multipart task submission
#[derive(Default)]
struct UploadData {
    input: NewTask,
    stored_path: Option<PathBuf>,
}

pub async fn add_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    tracing::debug!("Adding task for user: {}", identity.username);

    let mut data = UploadData::default();
    if let Err(e) = process_multipart_form(&mut multipart, &state.config.upload.upload_dir, &mut data).await {
        discard_upload(data.stored_path.as_deref()).await;
        return Err(e);
    }

    match state.tasks.create_task(data.input).await {
        Ok(task) => Ok((StatusCode::CREATED, Json(task)).into_response()),
        Err(e) => {
            // the upload has no task to belong to
            discard_upload(data.stored_path.as_deref()).await;
            Err(e)
        }
    }
}

async fn process_multipart_form(
    multipart: &mut Multipart,
    upload_dir: &str,
    data: &mut UploadData,
) -> AppResult<()> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => data.input.title = Some(read_text(field).await?),
            "description" => data.input.description = Some(read_text(field).await?),
            "dueDate" => data.input.due_date = Some(read_text(field).await?),
            "file" => {
                let original = field.file_name().unwrap_or_default().to_string();
                if original.is_empty() {
                    // browsers send an empty part when no file was chosen
                    continue;
                }
                if data.stored_path.is_some() {
                    // a task references one attachment; the caller discards the first
                    return Err(AppError::Upload("Only one file may be attached".into()));
                }
                let (stored_name, path) = save_upload(field, upload_dir, &original).await?;
                data.stored_path = Some(path);
                data.input.file = Some(stored_name);
            }
            other => tracing::warn!("Unexpected form field: {}", other),
        }
    }
    Ok(())
}

async fn read_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Upload(format!("Failed to read field: {}", e)))
}

// Stores the upload as `<unix millis>-<sanitized name>` inside the upload directory
async fn save_upload(
    mut field: Field<'_>,
    upload_dir: &str,
    original: &str,
) -> AppResult<(String, PathBuf)> {
    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory {}: {}", upload_dir, e);
        AppError::File(e)
    })?;

    let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), sanitize_filename(original));
    let path = FilePath::new(upload_dir).join(&stored_name);
    let mut file = File::create(&path).await?;

    let written = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Upload(format!("Failed to read upload: {}", e)))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok::<_, AppError>(())
    }
    .await;

    if let Err(e) = written {
        drop(file);
        discard_upload(Some(&path)).await;
        return Err(e);
    }

    tracing::debug!("Saved upload {} -> {}", original, path.display());
    Ok((stored_name, path))
}

async fn discard_upload(path: Option<&FilePath>) {
    if let Some(path) = path {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

/// Keeps the last path component and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Only names `sanitize_filename` could have produced are served.
fn is_servable_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    tracing::info!("Starting download for file: {}", filename);

    if !is_servable_filename(&filename) {
        tracing::warn!("Rejected download name: {}", filename);
        return Err(AppError::NotFound(format!("File {}", filename)));
    }

    let path = FilePath::new(&state.config.upload.upload_dir).join(&filename);
    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("File {}", filename)));
        }
        Err(e) => {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            return Err(AppError::File(e));
        }
    };
    let file_size = file.metadata().await?.len();

    // Stream chunk by chunk rather than buffering the whole file
    let body = Body::from_stream(ReaderStream::new(BufReader::new(file)));

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
            (header::CONTENT_LENGTH, file_size.to_string()),
        ],
        body,
    )
        .into_response())
}
