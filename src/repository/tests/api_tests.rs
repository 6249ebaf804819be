use super::*;
use crate::query::binds;
use crate::test_support::{
    admin_login, encoding, student_login, Fixture, ScriptedVision, STUDENT_EMAIL,
};
use serde_json::json;

fn vision_seeing(value: f64) -> Arc<dyn VisionService> {
    Arc::new(ScriptedVision::capturing(encoding(value)))
}

fn door() -> DeviceModel {
    DeviceModel {
        mac: Some("aa:bb:cc".to_string()),
        local: Some("Lab 1".to_string()),
        ip: None,
    }
}

#[tokio::test]
async fn test_select_user_table_returns_profiles() {
    let fixture = Fixture::seeded().await;
    let outcome = fixture.api(vision_seeing(0.1)).select_user_table().await;
    let profiles = outcome.into_success().unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles.iter().any(|p| p.alias.as_deref() == Some("admin")));
}

#[tokio::test]
async fn test_user_is_admin() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));

    assert_eq!(api.user_is_admin(&admin_login()).await.into_success(), Some(true));
    assert_eq!(api.user_is_admin(&student_login()).await.into_success(), Some(false));

    let wrong_password = LoginModel::new(crate::test_support::ADMIN_EMAIL, "wrong").unwrap();
    assert_eq!(api.user_is_admin(&wrong_password).await.into_success(), Some(false));
}

#[tokio::test]
async fn test_user_is_admin_fault_keeps_severity() {
    let fixture = Fixture::new().await;
    let tables = TableNames {
        perfis: "nao_existe".to_string(),
        ..TableNames::default()
    };
    let api = ApiRepository::new(fixture.database(), vision_seeing(0.1), tables);
    let outcome = api.user_is_admin(&admin_login()).await;
    assert!(outcome.is_critical());
    assert_eq!(
        outcome.failure_or_none().map(String::as_str),
        Some("Erro ao verificar permissões do usuário")
    );
}

#[tokio::test]
async fn test_find_user_by_login_and_missing_user() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));

    let found = api.find_user(student_login().bind_values()).await;
    assert_eq!(found.into_success().unwrap().id, "00000002");

    let missing = api.find_user(binds([("email", json!("ninguem@example.com"))])).await;
    assert!(missing.is_failure());
    assert!(!missing.is_critical());

    let empty = api.find_user(BindMap::new()).await;
    assert_eq!(
        empty.failure_or_none().map(String::as_str),
        Some("Erro ao ler dados do request")
    );
}

#[tokio::test]
async fn test_insert_user_table_hashes_password() {
    let fixture = Fixture::new().await;
    let api = fixture.api(vision_seeing(0.1));
    let user = UserModel {
        id: Some("00000010".to_string()),
        nome: Some("Nova".to_string()),
        email: Some("nova@example.com".to_string()),
        senha: Some("plain".to_string()),
        ..UserModel::default()
    };
    assert_eq!(api.insert_user_table(&user).await.into_success(), Some(1));

    let rows = fixture.rows("SELECT senha FROM perfis").await;
    assert_eq!(rows[0]["senha"], json!(crate::utils::hash_sha256("plain")));
}

#[tokio::test]
async fn test_insert_duplicate_email_is_critical() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));
    let user = UserModel {
        id: Some("00000011".to_string()),
        email: Some(STUDENT_EMAIL.to_string()),
        ..UserModel::default()
    };
    let outcome = api.insert_user_table(&user).await;
    assert!(outcome.is_critical());
    assert_eq!(outcome.failure_or_none().map(String::as_str), Some("Erro ao inserir usuário"));
}

#[tokio::test]
async fn test_update_requires_exactly_one_row() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));
    let patch = UserModel {
        matricula: Some("2024001".to_string()),
        ..UserModel::default()
    };

    let nobody = UserModel {
        id: Some("99999999".to_string()),
        ..UserModel::default()
    };
    let outcome = api.update_user_table(&nobody, &patch).await;
    assert!(outcome.is_failure());
    assert!(!outcome.is_critical());

    // An empty filter never reaches the datastore.
    assert!(api
        .update_user_table(&UserModel::default(), &patch)
        .await
        .is_critical());

    fixture
        .execute("UPDATE perfis SET matricula = 'X'", BindMap::new())
        .await;
    let both = UserModel {
        matricula: Some("X".to_string()),
        ..UserModel::default()
    };
    let outcome = api.update_user_table(&both, &patch).await;
    assert_eq!(
        outcome.failure_or_none().map(String::as_str),
        Some("Mais de um usuário foi atualizado")
    );
    assert!(!outcome.is_critical());

    let one = UserModel {
        id: Some("00000002".to_string()),
        ..UserModel::default()
    };
    assert_eq!(api.update_user_table(&one, &patch).await.into_success(), Some(1));
}

#[tokio::test]
async fn test_delete_with_empty_filter_is_rejected() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));
    let outcome = api.delete_user_table(&UserModel::default()).await;
    assert!(outcome.is_failure());
    assert!(!outcome.is_critical());
    assert_eq!(fixture.rows("SELECT * FROM perfis").await.len(), 2);
}

#[tokio::test]
async fn test_open_door_recognizes_student_and_strips_encodings() {
    let fixture = Fixture::seeded().await;
    let outcome = fixture.api(vision_seeing(0.1)).open_door(&door()).await;
    assert_eq!(outcome.log(), Some("Porta Aberta"));
    let grant = outcome.into_success().unwrap();
    assert_eq!(grant.profile.id, "00000002");
    assert!(grant.profile.encodings.is_none());
    assert!((grant.similarity - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_open_door_unknown_face_is_denied() {
    let fixture = Fixture::seeded().await;
    let outcome = fixture.api(vision_seeing(0.5)).open_door(&door()).await;
    assert!(outcome.is_failure());
    assert!(!outcome.is_critical());
    assert_eq!(outcome.log(), Some("Acesso Negado"));
}

#[tokio::test]
async fn test_open_door_unknown_device_is_denied_before_capture() {
    let fixture = Fixture::seeded().await;
    let vision = Arc::new(ScriptedVision::capturing(encoding(0.1)));
    let api = fixture.api(vision.clone());
    let device = DeviceModel {
        mac: Some("ff:ff".to_string()),
        ..DeviceModel::default()
    };
    let outcome = api.open_door(&device).await;
    assert!(outcome.is_failure());
    assert!(!outcome.is_critical());
    assert_eq!(vision.capture_count(), 0);
}

#[tokio::test]
async fn test_open_door_without_device_data_is_critical() {
    let fixture = Fixture::seeded().await;
    let outcome = fixture
        .api(vision_seeing(0.1))
        .open_door(&DeviceModel::default())
        .await;
    assert!(outcome.is_critical());
    assert_eq!(outcome.log(), Some("Erro Device"));
}

#[tokio::test]
async fn test_open_door_capture_failure_is_critical() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(Arc::new(ScriptedVision::without_face()));
    let outcome = api.open_door(&door()).await;
    assert!(outcome.is_critical());
    assert_eq!(outcome.log(), Some("Erro Face"));
}

#[tokio::test]
async fn test_open_door_corrupt_encoding_is_critical() {
    let fixture = Fixture::seeded().await;
    fixture
        .execute("UPDATE perfis SET encodings = '0.1,0.2' WHERE id = '00000001'", BindMap::new())
        .await;
    let outcome = fixture.api(vision_seeing(0.1)).open_door(&door()).await;
    assert!(outcome.is_critical());
    assert_eq!(outcome.log(), Some("Erro Encode"));
}

#[tokio::test]
async fn test_insert_historic_table() {
    let fixture = Fixture::seeded().await;
    let api = fixture.api(vision_seeing(0.1));
    let mut historic = HistoricModel::new("Aluno Um", "aluno", STUDENT_EMAIL).with_device(&door());
    historic.set_log("Usuario aluno entrou em Lab 1 !");

    let outcome = api.insert_historic_table(&historic).await;
    assert_eq!(outcome.log(), Some("Histórico inserido com sucesso"));

    let rows = fixture.rows("SELECT alias, local, ip, log FROM historico").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["local"], json!("Lab 1"));
    assert_eq!(rows[0]["ip"], json!("0.0.0.1"));
}
