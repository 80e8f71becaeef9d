use axum::response::{IntoResponse, Response};
use catalog_dal::{
    book::BookShort,
    genre::{CreateGenre, Genre},
};
use http::StatusCode;
use tracing::{debug, error};

use crate::{validate::Rejected, views};

pub type ApiResult<T, E = AppError> = std::result::Result<T, E>;

pub const INTEGRITY_DENIAL_MESSAGE: &str = "Genre has associated books and cannot be deleted.";

/// Every outcome of a catalog request other than a regular page or redirect.
///
/// Each variant carries what is needed to render its own response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid genre form: {}", .errors.join(", "))]
    ValidationFailure {
        genre: CreateGenre,
        errors: Vec<String>,
    },

    #[error("Genre {} is referenced by {} books", .genre_id, .books.len())]
    IntegrityDenial {
        genre_id: i64,
        genre: Option<Genre>,
        books: Vec<BookShort>,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] catalog_dal::Error),

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),
}

impl From<catalog_dal::Error> for AppError {
    fn from(value: catalog_dal::Error) -> Self {
        match value {
            catalog_dal::Error::RecordNotFound(what) => {
                AppError::NotFound(format!("{what} not found"))
            }
            other => AppError::StoreUnavailable(other),
        }
    }
}

impl From<Rejected> for AppError {
    fn from(value: Rejected) -> Self {
        AppError::ValidationFailure {
            genre: value.genre,
            errors: value.errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let page = match self {
            AppError::NotFound(message) => {
                debug!("Not found: {message}");
                views::error_page(StatusCode::NOT_FOUND, &message)
                    .map(|page| (StatusCode::NOT_FOUND, page).into_response())
            }
            AppError::ValidationFailure { genre, errors } => {
                debug!("Genre form rejected: {errors:?}");
                views::genre_form(Some(&genre), &errors).map(IntoResponse::into_response)
            }
            AppError::IntegrityDenial {
                genre_id,
                genre,
                books,
            } => {
                debug!("Refused to delete genre {genre_id}, it has {} books", books.len());
                views::genre_delete(
                    genre_id,
                    genre.as_ref(),
                    &books,
                    Some(INTEGRITY_DENIAL_MESSAGE),
                )
                .map(|page| (StatusCode::CONFLICT, page).into_response())
            }
            AppError::StoreUnavailable(e) => {
                error!("Store error: {e}");
                views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    .map(|page| (StatusCode::INTERNAL_SERVER_ERROR, page).into_response())
            }
            AppError::Render(e) => Err(e),
        };

        match page {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to render page: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Fallback for unknown paths.
pub async fn page_not_found() -> AppError {
    AppError::NotFound("Page not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dal_errors_mapping() {
        let err: AppError = catalog_dal::Error::RecordNotFound("Genre".to_string()).into();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Genre not found"));

        let err: AppError = catalog_dal::Error::DatabaseError(sqlx_pool_closed()).into();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    fn sqlx_pool_closed() -> catalog_dal::SqlxError {
        catalog_dal::SqlxError::PoolClosed
    }

    #[test]
    fn test_status_codes() {
        let response = AppError::NotFound("Genre not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::ValidationFailure {
            genre: CreateGenre {
                name: "ab".to_string(),
            },
            errors: vec![crate::validate::NAME_TOO_SHORT.to_string()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = AppError::IntegrityDenial {
            genre_id: 1,
            genre: None,
            books: vec![],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response =
            AppError::StoreUnavailable(catalog_dal::Error::DatabaseError(sqlx_pool_closed()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
