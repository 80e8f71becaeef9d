//! Genre pages: listing, detail, creation and guarded deletion.

use axum::{
    extract::Path,
    response::{IntoResponse, Redirect},
    routing::get,
    Form,
};
use catalog_dal::{book::BookRepository, genre::GenreRepository};
use tracing::{debug, info};

use crate::{
    error::{ApiResult, AppError},
    repository_from_request,
    state::AppState,
    validate::GenreForm,
    views, CATALOG_ROOT,
};

repository_from_request!(GenreRepository);
repository_from_request!(BookRepository);

pub const GENRE_NOT_FOUND: &str = "Genre not found";

pub fn genre_list_url() -> String {
    format!("{CATALOG_ROOT}/genres")
}

pub fn genre_url(id: i64) -> String {
    format!("{CATALOG_ROOT}/genre/{id}")
}

fn genre_not_found() -> AppError {
    AppError::NotFound(GENRE_NOT_FOUND.to_string())
}

/// Identifiers that cannot be parsed can never match a record.
fn parse_id(id: &str) -> ApiResult<i64> {
    id.parse().map_err(|_| genre_not_found())
}

pub async fn list(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let genres = repository.list_all().await?;
    Ok(views::genre_list(&genres)?)
}

pub async fn detail(
    Path(id): Path<String>,
    genres: GenreRepository,
    books: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (genre, genre_books) = tokio::try_join!(genres.find(id), books.list_by_genre(id))?;
    let genre = genre.ok_or_else(genre_not_found)?;

    Ok(views::genre_detail(&genre, &genre_books)?)
}

pub async fn create_form() -> ApiResult<impl IntoResponse> {
    Ok(views::genre_form(None, &[])?)
}

/// Creates a genre unless one with the same sanitized name exists.
///
/// Both cases end with a redirect to the genre page. The lookup and the insert
/// are separate statements, two concurrent submissions can both insert.
pub async fn create(
    repository: GenreRepository,
    Form(form): Form<GenreForm>,
) -> ApiResult<Redirect> {
    let candidate = form.sanitize()?;

    if let Some(existing) = repository.find_by_name(&candidate.name).await? {
        debug!("Genre {} already exists as {}", existing.name, existing.id);
        return Ok(Redirect::to(&genre_url(existing.id)));
    }

    let genre = repository.create(candidate).await?;
    info!("Created genre {} with id {}", genre.name, genre.id);
    Ok(Redirect::to(&genre_url(genre.id)))
}

pub async fn delete_form(
    Path(id): Path<String>,
    genres: GenreRepository,
    books: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let (genre, genre_books) = tokio::try_join!(genres.find(id), books.list_by_genre(id))?;
    let genre = genre.ok_or_else(genre_not_found)?;

    Ok(views::genre_delete(genre.id, Some(&genre), &genre_books, None)?)
}

/// Deletes a genre which no book refers to.
///
/// Books are checked again here, they might have been added after the
/// confirmation page was shown.
pub async fn delete(
    Path(id): Path<String>,
    genres: GenreRepository,
    books: BookRepository,
) -> ApiResult<Redirect> {
    let id = parse_id(&id)?;

    let blocking = books.list_by_genre(id).await?;
    if !blocking.is_empty() {
        let genre = genres.find(id).await?;
        return Err(AppError::IntegrityDenial {
            genre_id: id,
            genre,
            books: blocking,
        });
    }

    match genres.delete(id).await {
        Ok(()) => info!("Deleted genre {id}"),
        Err(catalog_dal::Error::RecordNotFound(_)) => debug!("Genre {id} was already deleted"),
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to(&genre_list_url()))
}

pub async fn update_form() -> &'static str {
    "NOT IMPLEMENTED: Genre update GET"
}

pub async fn update() -> &'static str {
    "NOT IMPLEMENTED: Genre update POST"
}

async fn index() -> Redirect {
    Redirect::to(&genre_list_url())
}

/// Routes relative to the catalog root.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(index))
        .route("/genres", get(list))
        .route("/genre/create", get(create_form).post(create))
        .route("/genre/{id}", get(detail))
        .route("/genre/{id}/delete", get(delete_form).post(delete))
        .route("/genre/{id}/update", get(update_form).post(update))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(genre_url(12), "/catalog/genre/12");
        assert_eq!(genre_list_url(), "/catalog/genres");
    }

    #[test]
    fn test_unparsable_id_is_not_found() {
        assert_eq!(parse_id("42").unwrap(), 42);
        let err = parse_id("5f1b2c").unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == GENRE_NOT_FOUND));
    }
}
