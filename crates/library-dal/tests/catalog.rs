use futures::TryStreamExt as _;
use library_dal::{
    author::{AuthorRepositoryImpl, CreateAuthor},
    book::{BookRepositoryImpl, CreateBook},
    book_instance::{BookInstanceRepositoryImpl, BookStatus, CreateBookInstance},
    genre::{CreateGenre, GenreRepositoryImpl},
    integrity::{DeleteOutcome, IntegrityGuardImpl},
};
use sqlx::Executor;
use time::macros::date;

const TEST_DATA: &str = r#"
INSERT INTO author (id, first_name, last_name, date_of_birth, date_of_death)
VALUES (1, 'Karel', 'Capek', '1890-01-09', '1938-12-25');
INSERT INTO author (id, first_name, last_name, date_of_birth, date_of_death)
VALUES (2, 'Isaac', 'Asimov', '1920-01-02', '1992-04-06');
INSERT INTO author (id, first_name, last_name, date_of_birth, date_of_death)
VALUES (3, 'Nobody', 'Wrote', NULL, NULL);

INSERT INTO genre (id, name) VALUES (1, 'Sci-Fi');
INSERT INTO genre (id, name) VALUES (2, 'Drama');
INSERT INTO genre (id, name) VALUES (3, 'Poetry');

INSERT INTO book (id, title, author_id, summary, isbn)
VALUES (1, 'R.U.R.', 1, 'Robots rebel', '978-0-14-118208-0');
INSERT INTO book (id, title, author_id, summary, isbn)
VALUES (2, 'Foundation', 2, 'Psychohistory', '978-0-553-29335-7');

INSERT INTO book_genre (book_id, genre_id) VALUES (1, 1);
INSERT INTO book_genre (book_id, genre_id) VALUES (1, 2);
INSERT INTO book_genre (book_id, genre_id) VALUES (2, 1);

INSERT INTO book_instance (id, book_id, imprint, status, due_back)
VALUES (1, 1, 'Aventinum 1920', 'Available', '2020-01-01');
INSERT INTO book_instance (id, book_id, imprint, status, due_back)
VALUES (2, 1, 'Penguin 2004', 'Loaned', '2030-06-15');
INSERT INTO book_instance (id, book_id, imprint, status, due_back)
VALUES (3, 2, 'Gnome Press 1951', 'Available', '2020-01-01');
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    library_dal::migrate(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

#[tokio::test]
async fn test_authors_sorted_by_last_name() {
    let conn = init_db().await;
    let repo = AuthorRepositoryImpl::new(conn);

    let authors = repo.list().await.unwrap();
    let names: Vec<_> = authors.iter().map(|a| a.last_name.as_str()).collect();
    assert_eq!(vec!["Asimov", "Capek", "Wrote"], names);
    assert_eq!(3, repo.count().await.unwrap());

    let capek = repo.get(1).await.unwrap();
    assert_eq!(Some(date!(1890 - 01 - 09)), capek.date_of_birth);
    assert_eq!(
        "January 9th, 1890 - December 25th, 1938",
        capek.life_span()
    );
}

#[tokio::test]
async fn test_author_update_replaces_all_fields() {
    let conn = init_db().await;
    let repo = AuthorRepositoryImpl::new(conn);

    let updated = repo
        .update(
            1,
            CreateAuthor {
                first_name: "Josef".to_string(),
                last_name: "Capek".to_string(),
                date_of_birth: None,
                date_of_death: None,
            },
        )
        .await
        .unwrap();
    assert_eq!("Josef", updated.first_name);
    assert_eq!(None, updated.date_of_birth);
    assert_eq!(None, updated.date_of_death);

    let missing = repo
        .update(
            99,
            CreateAuthor {
                first_name: "Josef".to_string(),
                last_name: "Capek".to_string(),
                date_of_birth: None,
                date_of_death: None,
            },
        )
        .await;
    assert!(missing.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_author_delete_blocked_by_books() {
    let conn = init_db().await;
    let guard = IntegrityGuardImpl::new(conn.clone());
    let authors = AuthorRepositoryImpl::new(conn);

    let outcome = guard.delete_author(1).await.unwrap();
    match outcome {
        DeleteOutcome::Blocked { entity, dependents } => {
            assert_eq!("Capek", entity.last_name);
            assert_eq!(1, dependents.len());
            assert_eq!("R.U.R.", dependents[0].title);
        }
        DeleteOutcome::Deleted(_) => panic!("Author with books must not be deleted"),
    }
    assert_eq!(3, authors.count().await.unwrap());
    assert!(authors.get(1).await.is_ok());
}

#[tokio::test]
async fn test_author_delete_without_books() {
    let conn = init_db().await;
    let guard = IntegrityGuardImpl::new(conn.clone());
    let authors = AuthorRepositoryImpl::new(conn);

    assert!(guard.author_dependents(3).await.unwrap().is_empty());
    let outcome = guard.delete_author(3).await.unwrap();
    assert!(outcome.is_deleted());

    let remaining = authors.list().await.unwrap();
    assert!(remaining.iter().all(|a| a.id != 3));

    let again = guard.delete_author(3).await;
    assert!(again.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_genre_delete_guard() {
    let conn = init_db().await;
    let guard = IntegrityGuardImpl::new(conn.clone());
    let genres = GenreRepositoryImpl::new(conn);

    let outcome = guard.delete_genre(1).await.unwrap();
    match outcome {
        DeleteOutcome::Blocked { entity, dependents } => {
            assert_eq!("Sci-Fi", entity.name);
            let titles: Vec<_> = dependents.iter().map(|b| b.title.as_str()).collect();
            assert_eq!(vec!["Foundation", "R.U.R."], titles);
        }
        DeleteOutcome::Deleted(_) => panic!("Genre in use must not be deleted"),
    }

    let outcome = guard.delete_genre(3).await.unwrap();
    assert!(outcome.is_deleted());
    let names: Vec<_> = genres
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(vec!["Drama", "Sci-Fi"], names);
}

#[tokio::test]
async fn test_new_genre_blocked_once_used() {
    let conn = init_db().await;
    let genres = GenreRepositoryImpl::new(conn.clone());
    let books = BookRepositoryImpl::new(conn.clone());
    let guard = IntegrityGuardImpl::new(conn);

    let genre = genres
        .create(CreateGenre {
            name: "Space Opera".to_string(),
        })
        .await
        .unwrap();
    let book = books
        .create(CreateBook {
            title: "Dune".to_string(),
            author_id: 2,
            summary: "Spice".to_string(),
            isbn: "978-0441013593".to_string(),
            genres: vec![genre.id],
        })
        .await
        .unwrap();

    match guard.delete_genre(genre.id).await.unwrap() {
        DeleteOutcome::Blocked { dependents, .. } => {
            assert_eq!(1, dependents.len());
            assert_eq!(book.id, dependents[0].id);
        }
        DeleteOutcome::Deleted(_) => panic!("Genre in use must not be deleted"),
    }
    assert!(genres.get(genre.id).await.is_ok());
}

#[tokio::test]
async fn test_book_create_and_update() {
    let conn = init_db().await;
    let books = BookRepositoryImpl::new(conn.clone());
    let genres = GenreRepositoryImpl::new(conn);

    let book = books
        .create(CreateBook {
            title: "I, Robot".to_string(),
            author_id: 2,
            summary: "Three laws".to_string(),
            isbn: "978-0553382563".to_string(),
            genres: vec![],
        })
        .await
        .unwrap();
    assert!(book.genres.is_empty());
    assert_eq!(3, books.count().await.unwrap());

    let updated = books
        .update(
            book.id,
            CreateBook {
                title: "I, Robot".to_string(),
                author_id: 2,
                summary: "Three laws of robotics".to_string(),
                isbn: "978-0553382563".to_string(),
                genres: vec![2, 1, 2],
            },
        )
        .await
        .unwrap();
    assert_eq!(vec![1, 2], updated.genres);
    assert_eq!("Three laws of robotics", updated.summary);

    let names: Vec<_> = genres
        .list_for_book(book.id)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(vec!["Drama", "Sci-Fi"], names);

    let list = books.list().await.unwrap();
    let titles: Vec<_> = list.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(vec!["Foundation", "I, Robot", "R.U.R."], titles);
    assert_eq!(Some("Isaac Asimov".to_string()), list[1].author_name());
}

#[tokio::test]
async fn test_book_delete_leaves_copies() {
    let conn = init_db().await;
    let books = BookRepositoryImpl::new(conn.clone());
    let instances = BookInstanceRepositoryImpl::new(conn.clone());
    let guard = IntegrityGuardImpl::new(conn);

    books.delete(1).await.unwrap();
    assert!(books.get(1).await.unwrap_err().is_not_found());
    assert!(guard.genre_dependents(2).await.unwrap().is_empty());

    let copies = instances.list_for_book(1).await.unwrap();
    assert_eq!(2, copies.len());
    let orphan = instances.get_item(1).await.unwrap();
    assert_eq!(None, orphan.book_title);

    assert!(books.delete(1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_book_instances() {
    let conn = init_db().await;
    let instances = BookInstanceRepositoryImpl::new(conn);

    assert_eq!(3, instances.count().await.unwrap());
    assert_eq!(
        2,
        instances
            .count_by_status(BookStatus::Available)
            .await
            .unwrap()
    );

    let created = instances
        .create(CreateBookInstance {
            book_id: 2,
            imprint: "Bantam 1991".to_string(),
            status: BookStatus::default(),
            due_back: date!(2024 - 02 - 29),
        })
        .await
        .unwrap();
    assert_eq!(BookStatus::Maintenance, created.status);
    assert_eq!("February 29th, 2024", created.due_back_formatted());

    let updated = instances
        .update(
            created.id,
            CreateBookInstance {
                book_id: 2,
                imprint: "Bantam 1991".to_string(),
                status: BookStatus::Reserved,
                due_back: date!(2024 - 03 - 01),
            },
        )
        .await
        .unwrap();
    assert_eq!(BookStatus::Reserved, updated.status);

    let list = instances.list().await.unwrap();
    assert_eq!(4, list.len());
    assert_eq!(Some("Foundation".to_string()), list[0].book_title);

    instances.delete(created.id).await.unwrap();
    assert!(instances.get(created.id).await.unwrap_err().is_not_found());
}
