use library_e2e_tests::{
    launch_env, location, prepare_env,
    rest::{create_author, create_book, create_copy, id_of, page_text},
};
use time::OffsetDateTime;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_book_without_genre() {
    let (args, _config_guard) = prepare_env("test_book_no_genre").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    let author = create_author(&client, &base_url, "Karel", "Capek")
        .await
        .unwrap();
    let book = create_book(&client, &base_url, "War with the Newts", id_of(&author), &[])
        .await
        .unwrap();
    assert!(book.starts_with("/catalog/book/"));

    let body = page_text(&client, &base_url, &book).await.unwrap();
    assert!(body.contains("War with the Newts"));
    assert!(body.contains("Capek, Karel"));

    let body = page_text(&client, &base_url, "/catalog/books").await.unwrap();
    assert!(body.contains("War with the Newts"));
}

#[tokio::test]
#[traced_test]
async fn test_copy_defaults_and_delete() {
    let (args, _config_guard) = prepare_env("test_copy_defaults").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    let author = create_author(&client, &base_url, "Isaac", "Asimov")
        .await
        .unwrap();
    let book = create_book(&client, &base_url, "Foundation", id_of(&author), &[])
        .await
        .unwrap();
    let copy = create_copy(&client, &base_url, id_of(&book), "Gnome Press, 1951")
        .await
        .unwrap();

    let body = page_text(&client, &base_url, &copy).await.unwrap();
    info!("Copy page: {body}");
    assert!(body.contains("Maintenance"));
    assert!(body.contains("Gnome Press, 1951"));

    let today = OffsetDateTime::now_utc().date();
    let body = page_text(&client, &base_url, &format!("{copy}/update"))
        .await
        .unwrap();
    assert!(body.contains(&format!("value=\"{today}\"")));

    let body = page_text(&client, &base_url, "/catalog").await.unwrap();
    assert!(body.contains("<strong>Copies:</strong> 1"));

    let delete_url = base_url
        .join(&format!("{}/delete", book.trim_start_matches('/')))
        .unwrap();
    let response = client.post(delete_url).send().await.unwrap();
    assert_eq!(303, response.status().as_u16());
    assert_eq!("/catalog/books", location(&response).unwrap());

    let body = page_text(&client, &base_url, "/catalog/books").await.unwrap();
    assert!(body.contains("There are no books."));
    let body = page_text(&client, &base_url, &copy).await.unwrap();
    assert!(body.contains("(deleted book)"));
}
