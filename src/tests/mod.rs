
pub mod utils;

use ::surrealdb::{Surreal, engine::remote::ws::Client};

use std::sync::Arc;

use serde::Deserialize;
use surrealdb_migrations::MigrationRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::{
    surrealdb::{SURREALDB_PORT, SurrealDb},
    testcontainers::runners::AsyncRunner,
};

use crate::services::cloudinary::mock::MediaUploaderImpl;
use crate::{MIGRATIONS_DIR, infrastructure::databases::surrealdb};
use crate::{config::AppConfig, container::Container};

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test::{self, TestRequest},
};

use serde_json::{Value, json};

use rstest::*;

pub struct Database {
    pub connection: Surreal<Client>,
    pub container: ContainerAsync<SurrealDb>,
}

pub struct TestContext {
    pub db: Database,
    pub uploader: Arc<MediaUploaderImpl>,
    pub container: Arc<Container>,
    pub allowed_origins: Vec<String>,
}

#[fixture]
async fn context() -> TestContext {
    let db_container = SurrealDb::default()
        .with_tag("latest")
        .start()
        .await
        .unwrap();

    let mut config = AppConfig::load().unwrap();

    config.surrealdb.port = db_container
        .get_host_port_ipv4(SURREALDB_PORT)
        .await
        .unwrap();

    let db_connection = surrealdb::connect(&config.surrealdb).await.unwrap();

    MigrationRunner::new(&db_connection)
        .load_files(&MIGRATIONS_DIR)
        .up()
        .await
        .unwrap();

    let db = Database {
        connection: db_connection.clone(),
        container: db_container,
    };

    let uploader = Arc::new(MediaUploaderImpl::default());

    let container = Arc::new(Container::new(
        db_connection,
        uploader.clone(),
        config.cloudinary.folder,
    ));

    TestContext {
        db,
        uploader,
        container,
        allowed_origins: config.cors.allowed_origins,
    }
}

/// Logs in and returns the issued token.
async fn login_token<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({
            "email": email,
            "password": password,
        }))
        .send_request(app)
        .await;

    let body: Value = test::read_body_json(res).await;

    body["data"]["token"].as_str().unwrap().to_string()
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct Error {
    code: u16,
    message: String,
    errors: Option<Value>,
}
