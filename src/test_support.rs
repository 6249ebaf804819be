//! Fixtures shared by unit tests: a seeded SQLite store and a scripted
//! vision collaborator.

use crate::commands::Outcome;
use crate::datastore::{Datastore, SqliteDatastore, TableNames};
use crate::models::{LoginModel, PermissionLevel, UserModel};
use crate::query::{binds, QueryModel};
use crate::repository::{ApiRepository, DatabaseRepository};
use crate::vision::{euclidean_distances, FeatureVector, VisionService, ENCODING_LEN};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const STUDENT_EMAIL: &str = "aluno@example.com";
pub const STUDENT_PASSWORD: &str = "aluno123";

pub fn encoding(value: f64) -> FeatureVector {
    match FeatureVector::new(vec![value; ENCODING_LEN]) {
        Ok(vector) => vector,
        Err(e) => panic!("fixture encoding: {}", e),
    }
}

/// Vision collaborator returning a scripted capture.
pub struct ScriptedVision {
    capture: Mutex<Outcome<FeatureVector, String>>,
    captures: AtomicUsize,
}

impl ScriptedVision {
    pub fn capturing(vector: FeatureVector) -> Self {
        Self {
            capture: Mutex::new(Outcome::success(vector)),
            captures: AtomicUsize::new(0),
        }
    }

    pub fn without_face() -> Self {
        Self {
            capture: Mutex::new(Outcome::failure("Nenhum rosto encontrado".to_string())),
            captures: AtomicUsize::new(0),
        }
    }

    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionService for ScriptedVision {
    async fn first_face_encoding(&self) -> Outcome<FeatureVector, String> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        match self.capture.lock() {
            Ok(capture) => capture.clone(),
            Err(_) => Outcome::fault("vision lock poisoned".to_string()),
        }
    }

    async fn face_distance(
        &self,
        known: &[FeatureVector],
        probe: &FeatureVector,
    ) -> anyhow::Result<Vec<f64>> {
        euclidean_distances(known, probe)
    }
}

/// A schema-initialized SQLite file in a temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub store: Arc<SqliteDatastore>,
    pub tables: TableNames,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteDatastore::new(dir.path().join("facegate.sqlite")));
        let tables = TableNames::default();
        store.apply_schema(&tables).await.unwrap();
        Self { dir, store, tables }
    }

    /// Fixture with one administrator, one student and one door.
    pub async fn seeded() -> Self {
        let fixture = Self::new().await;
        fixture
            .insert_user(UserModel {
                id: Some("00000001".to_string()),
                nome: Some("Admin Root".to_string()),
                alias: Some("admin".to_string()),
                email: Some(ADMIN_EMAIL.to_string()),
                senha: Some(ADMIN_PASSWORD.to_string()),
                permission_level: Some(PermissionLevel::Administrador),
                encodings: Some(encoding(0.9).to_text()),
                ..UserModel::default()
            })
            .await;
        fixture
            .insert_user(UserModel {
                id: Some("00000002".to_string()),
                nome: Some("Aluno Um".to_string()),
                alias: Some("aluno".to_string()),
                email: Some(STUDENT_EMAIL.to_string()),
                senha: Some(STUDENT_PASSWORD.to_string()),
                encodings: Some(encoding(0.1).to_text()),
                ..UserModel::default()
            })
            .await;
        fixture
            .execute(
                "INSERT INTO dispositivos (mac, local, ip) VALUES (:mac, :local, :ip)",
                binds([
                    ("mac", json!("aa:bb:cc")),
                    ("local", json!("Lab 1")),
                    ("ip", json!("10.0.0.7")),
                ]),
            )
            .await;
        fixture
    }

    pub async fn insert_user(&self, user: UserModel) {
        let mut query = QueryModel::new("perfis").with_values(user.bind_values());
        let sql = query.insert().unwrap().to_string();
        self.execute(&sql, query.binds()).await;
    }

    pub async fn execute(&self, sql: &str, values: crate::query::BindMap) {
        self.store.connect().await.unwrap();
        self.store.execute(sql, &values).await.unwrap();
        self.store.disconnect().await.unwrap();
    }

    pub async fn rows(&self, sql: &str) -> Vec<crate::datastore::Row> {
        self.store.connect().await.unwrap();
        let rows = self.store.fetch_all(sql, &Default::default()).await.unwrap();
        self.store.disconnect().await.unwrap();
        rows
    }

    pub fn database(&self) -> DatabaseRepository {
        DatabaseRepository::new(self.store.clone())
    }

    pub fn api(&self, vision: Arc<dyn VisionService>) -> ApiRepository {
        ApiRepository::new(self.database(), vision, self.tables.clone())
    }
}

pub fn admin_login() -> LoginModel {
    LoginModel::new(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap()
}

pub fn student_login() -> LoginModel {
    LoginModel::new(STUDENT_EMAIL, STUDENT_PASSWORD).unwrap()
}
