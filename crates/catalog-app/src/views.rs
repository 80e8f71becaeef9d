use axum::response::Html;
use catalog_dal::{
    book::BookShort,
    genre::{CreateGenre, Genre},
};
use http::StatusCode;
use lazy_static::lazy_static;
use tera::{Context, Tera};

lazy_static! {
    // Templates are compiled into the binary, a failure here is a build defect
    static ref TEMPLATES: Tera = load_templates().expect("Bundled templates are invalid");
}

fn load_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", include_str!("../templates/layout.html")),
        ("genre_list.html", include_str!("../templates/genre_list.html")),
        (
            "genre_detail.html",
            include_str!("../templates/genre_detail.html"),
        ),
        ("genre_form.html", include_str!("../templates/genre_form.html")),
        (
            "genre_delete.html",
            include_str!("../templates/genre_delete.html"),
        ),
        ("error.html", include_str!("../templates/error.html")),
    ])?;
    Ok(tera)
}

pub type Page = tera::Result<Html<String>>;

fn render(template: &str, title: &str, mut context: Context) -> Page {
    context.insert("title", title);
    TEMPLATES.render(template, &context).map(Html)
}

pub fn genre_list(genres: &[Genre]) -> Page {
    let mut context = Context::new();
    context.insert("genre_list", genres);
    render("genre_list.html", "Genre List", context)
}

pub fn genre_detail(genre: &Genre, books: &[BookShort]) -> Page {
    let mut context = Context::new();
    context.insert("genre", genre);
    context.insert("genre_books", books);
    render("genre_detail.html", "Genre Detail", context)
}

/// Creation form, optionally prefilled with a rejected candidate and its errors.
pub fn genre_form(genre: Option<&CreateGenre>, errors: &[String]) -> Page {
    let mut context = Context::new();
    context.insert("genre", &genre);
    context.insert("errors", errors);
    render("genre_form.html", "Create Genre", context)
}

/// Deletion confirmation.
///
/// `genre` may be missing when the page is shown for a denied deletion of a
/// record which was removed concurrently, the id is then used as a heading.
pub fn genre_delete(
    genre_id: i64,
    genre: Option<&Genre>,
    books: &[BookShort],
    error: Option<&str>,
) -> Page {
    let mut context = Context::new();
    context.insert("genre_id", &genre_id);
    context.insert("genre", &genre);
    context.insert("genre_books", books);
    context.insert("error", &error);
    render("genre_delete.html", "Delete Genre", context)
}

pub fn error_page(status: StatusCode, message: &str) -> Page {
    let mut context = Context::new();
    context.insert("message", message);
    context.insert("status", &status.as_u16());
    render("error.html", "Error", context)
}
