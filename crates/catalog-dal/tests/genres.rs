use catalog_dal::{
    book::{BookRepository, CreateBook},
    genre::{CreateGenre, GenreRepository},
    Error,
};
use futures::TryStreamExt as _;
use sqlx::Executor;

const TEST_DATA: &str = r#"
INSERT INTO genre (id, name) VALUES (1, 'crime');
INSERT INTO genre (id, name) VALUES (2, 'sci-fi');
INSERT INTO genre (id, name) VALUES (3, 'Fantasy');

INSERT INTO book (id, title, summary, isbn, genre_id)
VALUES (1, 'The Hound of the Baskervilles', 'A hound on the moor', '9780140437867', 1);
INSERT INTO book (id, title, summary, isbn, genre_id)
VALUES (2, 'A Study in Scarlet', 'First Holmes novel', '9780140439083', 1);
INSERT INTO book (id, title, summary, isbn, genre_id)
VALUES (3, 'Solaris', 'Ocean planet', '9780156027601', 2);
INSERT INTO book (id, title, summary, isbn, genre_id)
VALUES (4, 'Unsorted', 'No genre yet', '0000000000', NULL);
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    catalog_dal::migrate(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

#[tokio::test]
async fn test_genre_list_sorted_by_name() {
    let conn = init_db().await;
    let repo = GenreRepository::new(conn);

    let genres = repo.list_all().await.unwrap();
    let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
    // binary collation puts upper case first
    assert_eq!(names, vec!["Fantasy", "crime", "sci-fi"]);
}

#[tokio::test]
async fn test_genre_find() {
    let conn = init_db().await;
    let repo = GenreRepository::new(conn);

    let genre = repo.find(2).await.unwrap().unwrap();
    assert_eq!(genre.name, "sci-fi");

    assert!(repo.find(42).await.unwrap().is_none());
    let err = repo.get(42).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_genre_find_by_name_is_exact() {
    let conn = init_db().await;
    let repo = GenreRepository::new(conn);

    let genre = repo.find_by_name("crime").await.unwrap().unwrap();
    assert_eq!(genre.id, 1);

    assert!(repo.find_by_name("Crime").await.unwrap().is_none());
    assert!(repo.find_by_name("crime ").await.unwrap().is_none());
}

#[tokio::test]
async fn test_genre_create_and_delete() {
    let conn = init_db().await;
    let repo = GenreRepository::new(conn);

    let genre = repo
        .create(CreateGenre {
            name: "Poetry".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(genre.name, "Poetry");
    assert_eq!(repo.count().await.unwrap(), 4);
    assert_eq!(repo.get(genre.id).await.unwrap(), genre);

    repo.delete(genre.id).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 3);
    assert!(repo.find(genre.id).await.unwrap().is_none());

    let err = repo.delete(genre.id).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_books_by_genre() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    let books = repo.list_by_genre(1).await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "A Study in Scarlet");
    assert_eq!(books[1].summary, "A hound on the moor");

    assert!(repo.list_by_genre(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_book_create() {
    let conn = init_db().await;
    let repo = BookRepository::new(conn);

    let book = repo
        .create(CreateBook {
            title: "The Hobbit".to_string(),
            summary: "There and back again".to_string(),
            isbn: "9780547928227".to_string(),
            genre_id: Some(3),
        })
        .await
        .unwrap();
    assert_eq!(book.genre_id, Some(3));
    assert_eq!(repo.get(book.id).await.unwrap().title, "The Hobbit");

    let books = repo.list_by_genre(3).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, book.id);
}
