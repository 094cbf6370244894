use chrono::{TimeZone, Utc};
use std::sync::Arc;

use talleres_unidos::models::{
    EstadoSolicitud, EstatusAtendida, Localizacion, NuevaSolicitud, OrigenAtendida,
    RespuestaSolicitud,
};
use talleres_unidos::repositories::{
    InMemoryRequestRepository, InMemoryResponseRepository, RequestRepository, ResponseRepository,
};
use talleres_unidos::services::{
    AttendedListingService, FixedGeoLocation, LifecycleService, MemoryAttachmentStore,
};
use talleres_unidos::utils::AppError;

struct Taller {
    lifecycle: LifecycleService,
    listing: AttendedListingService,
    respuestas: Arc<dyn ResponseRepository>,
}

fn taller() -> Taller {
    let solicitudes: Arc<dyn RequestRepository> = Arc::new(InMemoryRequestRepository::new());
    let respuestas: Arc<dyn ResponseRepository> = Arc::new(InMemoryResponseRepository::new());
    let lifecycle = LifecycleService::new(
        solicitudes.clone(),
        respuestas.clone(),
        Arc::new(MemoryAttachmentStore::new()),
    )
    .with_geolocation(Arc::new(FixedGeoLocation::new(Localizacion::new(19.43, -99.13))));

    Taller {
        lifecycle,
        listing: AttendedListingService::new(solicitudes, respuestas.clone()),
        respuestas,
    }
}

fn brake_pad() -> NuevaSolicitud {
    NuevaSolicitud {
        vin: Some("1HT".to_string()),
        pieza: "brake pad".to_string(),
        taller: "North Shop".to_string(),
        fecha: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        nombre_mecanico: Some("Lee".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_brake_pad_de_principio_a_fin() {
    let t = taller();

    let solicitud = t.lifecycle.submit_request(brake_pad()).await.unwrap();
    assert_eq!(solicitud.estado, EstadoSolicitud::Pendiente);
    // Ubicación tomada del proveedor
    assert_eq!(solicitud.localizacion, Some(Localizacion::new(19.43, -99.13)));

    let respuesta = RespuestaSolicitud {
        mecanico: "Lee".to_string(),
        taller: "North Shop".to_string(),
        localizacion: Some(Localizacion::new(1.0, 1.0)),
        foto: Some("ref1".to_string()),
        ..Default::default()
    };
    let respondida = t
        .lifecycle
        .respond_to_request(&solicitud.id, respuesta)
        .await
        .unwrap();
    assert_eq!(respondida.solicitud_original, solicitud);
    assert!(!respondida.borrado_pendiente);

    assert!(t
        .lifecycle
        .list_by_status(EstadoSolicitud::Pendiente)
        .await
        .unwrap()
        .is_empty());

    let vista = t.listing.list(None).await.unwrap();
    assert_eq!(vista.talleres, vec!["All", "North Shop"]);
    assert_eq!(vista.solicitudes.len(), 1);
    assert_eq!(vista.solicitudes[0].estatus, EstatusAtendida::Enviado);

    t.lifecycle.finalize_response(&respondida.id).await.unwrap();
    let vista = t.listing.list(Some("North Shop")).await.unwrap();
    assert_eq!(vista.solicitudes[0].estatus, EstatusAtendida::Finalizado);

    t.lifecycle
        .purge(OrigenAtendida::Respuesta, &respondida.id)
        .await
        .unwrap();
    assert!(t.respuestas.list_all().await.unwrap().is_empty());
    assert!(t.listing.list(None).await.unwrap().solicitudes.is_empty());
}

#[tokio::test]
async fn test_responder_dos_veces_falla() {
    let t = taller();
    let solicitud = t.lifecycle.submit_request(brake_pad()).await.unwrap();

    let respuesta = RespuestaSolicitud {
        mecanico: "Lee".to_string(),
        taller: "North Shop".to_string(),
        foto: Some("ref1".to_string()),
        ..Default::default()
    };
    t.lifecycle
        .respond_to_request(&solicitud.id, respuesta.clone())
        .await
        .unwrap();

    let segunda = t.lifecycle.respond_to_request(&solicitud.id, respuesta).await;
    assert!(matches!(segunda, Err(AppError::NotFound(_))));
    assert_eq!(t.respuestas.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_instaladas_y_respuestas_en_la_misma_vista() {
    let t = taller();

    let mut instalada = brake_pad();
    instalada.estado_instalacion = true;
    instalada.vin = None;
    instalada.taller = "South Shop".to_string();
    t.lifecycle.submit_request(instalada).await.unwrap();

    let pendiente = t.lifecycle.submit_request(brake_pad()).await.unwrap();
    t.lifecycle
        .respond_with_photo(
            &pendiente.id,
            RespuestaSolicitud {
                mecanico: "Kim".to_string(),
                taller: "North Shop".to_string(),
                ..Default::default()
            },
            vec![0xFF, 0xD8],
        )
        .await
        .unwrap();

    let vista = t.listing.list(None).await.unwrap();
    assert_eq!(vista.solicitudes.len(), 2);
    assert_eq!(vista.solicitudes[0].estatus, EstatusAtendida::Enviado);
    assert_eq!(vista.solicitudes[1].estatus, EstatusAtendida::InstaladaDirecta);
    assert_eq!(vista.talleres.len(), 3);
}
