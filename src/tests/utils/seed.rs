use crate::domain::models::account::Account;
use ::surrealdb::{Surreal, engine::remote::ws::Client, sql::Thing};

pub const PASSWORD: &str = "stR0ngP4ssw0rd!";

/// Inserts an account without a token; `password` holds the plain text.
pub async fn seed_account(conn: &Surreal<Client>) -> Account {
    let query = format!(
        r#"
        LET $account = (CREATE account CONTENT {{
            name: '{}',
            email: '{}',
            password: crypto::argon2::generate('{}')
        }});
        RETURN $account[0].id;
        "#,
        "Test Account", "test_account@email.com", PASSWORD
    );

    let thing: Option<Thing> = conn.query(query).await.unwrap().take(1).unwrap();

    Account {
        id: thing.unwrap().id.to_string(),
        name: "Test Account".to_string(),
        email: "test_account@email.com".to_string(),
        password: PASSWORD.to_string(),
        avatar_url: None,
        purchased_avatar_urls: vec![],
        token: None,
    }
}

pub async fn count_named(conn: &Surreal<Client>, name: &str) -> i64 {
    let count: Option<i64> = conn
        .query("(SELECT count() FROM account WHERE name = $name GROUP ALL)[0].count OR 0")
        .bind(("name", name.to_owned()))
        .await
        .unwrap()
        .take(0)
        .unwrap();

    count.unwrap_or(0)
}
