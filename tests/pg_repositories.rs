#![cfg(feature = "pg-tests")]

use chrono::{TimeZone, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

use talleres_unidos::database::run_migrations;
use talleres_unidos::models::{
    EstadoSolicitud, Estatus, Localizacion, NuevaRespuesta, NuevaSolicitud, RespuestaSolicitud,
};
use talleres_unidos::repositories::{
    PgRequestRepository, PgRespondTransaction, PgResponseRepository, RequestRepository,
    RespondTransaction, ResponseRepository,
};
use talleres_unidos::services::{LifecycleService, MemoryAttachmentStore};
use talleres_unidos::utils::AppError;

// Todas las pruebas comparten la misma base
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

async fn pg_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(2))
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
            return None;
        }
    };
    run_migrations(&pool).await.unwrap();
    sqlx::query("TRUNCATE solicitudes, solicitudes_respondidas RESTART IDENTITY")
        .execute(&pool)
        .await
        .unwrap();
    Some(pool)
}

fn pendiente(pieza: &str) -> NuevaSolicitud {
    NuevaSolicitud {
        vin: Some("1HT".to_string()),
        pieza: pieza.to_string(),
        taller: "North Shop".to_string(),
        fecha: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        nombre_mecanico: Some("Lee".to_string()),
        localizacion: Some(Localizacion::new(1.0, 1.0)),
        ..Default::default()
    }
}

fn respuesta() -> RespuestaSolicitud {
    RespuestaSolicitud {
        mecanico: "Lee".to_string(),
        taller: "North Shop".to_string(),
        localizacion: Some(Localizacion::new(1.0, 1.0)),
        foto: Some("ref1".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn pg_solicitudes_conservan_orden_y_borran_una_vez() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = pg_pool().await else { return };
    let repo = PgRequestRepository::new(pool);

    let a = repo.create(pendiente("brake pad")).await.unwrap();
    let b = repo.create(pendiente("rotor")).await.unwrap();

    let ids: Vec<_> = repo
        .list_by_status(EstadoSolicitud::Pendiente)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![a.id.clone(), b.id]);

    assert_eq!(repo.find_by_id(&a.id).await.unwrap(), Some(a.clone()));
    repo.delete(&a.id).await.unwrap();
    assert!(matches!(repo.delete(&a.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn pg_respuesta_transiciones() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = pg_pool().await else { return };
    let solicitudes = PgRequestRepository::new(pool.clone());
    let respuestas = PgResponseRepository::new(pool);

    let original = solicitudes.create(pendiente("brake pad")).await.unwrap();
    let record = respuestas
        .create(NuevaRespuesta::new(respuesta(), original.clone()).marcar_borrado_pendiente())
        .await
        .unwrap();
    assert_eq!(record.solicitud_original, original);
    assert_eq!(respuestas.list_pending_deletion().await.unwrap().len(), 1);

    respuestas.confirm_deletion(&record.id).await.unwrap();
    assert!(respuestas.list_pending_deletion().await.unwrap().is_empty());

    let finalizada = respuestas
        .update_status(&record.id, Estatus::Finalizado)
        .await
        .unwrap();
    assert_eq!(finalizada.estatus, Estatus::Finalizado);
    assert!(matches!(
        respuestas.update_status(&record.id, Estatus::Finalizado).await,
        Err(AppError::InvalidTransition(_))
    ));
    assert!(matches!(
        respuestas.update_status("nope", Estatus::Finalizado).await,
        Err(AppError::NotFound(_))
    ));

    respuestas.delete(&record.id).await.unwrap();
    assert!(respuestas.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn pg_responder_en_transaccion() {
    let _guard = DB_LOCK.lock().await;
    let Some(pool) = pg_pool().await else { return };
    let solicitudes: Arc<dyn RequestRepository> = Arc::new(PgRequestRepository::new(pool.clone()));
    let respuestas: Arc<dyn ResponseRepository> = Arc::new(PgResponseRepository::new(pool.clone()));
    let transaccion = Arc::new(PgRespondTransaction::new(pool));

    let lifecycle = LifecycleService::new(
        solicitudes.clone(),
        respuestas.clone(),
        Arc::new(MemoryAttachmentStore::new()),
    )
    .with_transaction(transaccion.clone());

    let original = lifecycle.submit_request(pendiente("brake pad")).await.unwrap();
    let record = lifecycle
        .respond_to_request(&original.id, respuesta())
        .await
        .unwrap();

    assert_eq!(record.estatus, Estatus::Enviado);
    assert!(!record.borrado_pendiente);
    assert!(solicitudes.find_by_id(&original.id).await.unwrap().is_none());
    assert_eq!(respuestas.list_all().await.unwrap().len(), 1);

    // Ya no existe: la transacción no escribe nada
    assert!(matches!(
        transaccion.respond_atomically(&original.id, respuesta()).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(respuestas.list_all().await.unwrap().len(), 1);
}
