//! Listado de solicitudes atendidas
//!
//! Une las respuestas (cualquier estatus) con las solicitudes instaladas
//! directamente, arma el dominio del filtro de talleres, filtra y ordena.
//! Sólo lee; nunca escribe.
//!
//! El dominio del filtro usa nombres normalizados pero el filtro compara
//! contra el valor crudo guardado, así que `"Acme "` no aparece al elegir
//! `"Acme"`. Se conserva tal cual porque es lo que los operadores ya ven.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::models::{EstadoSolicitud, SolicitudAtendida, VistaAtendidas, FILTRO_TODOS};
use crate::repositories::{RequestRepository, ResponseRepository};
use crate::utils::errors::AppResult;
use crate::utils::validation::normalize_whitespace;

pub struct AttendedListingService {
    solicitudes: Arc<dyn RequestRepository>,
    respuestas: Arc<dyn ResponseRepository>,
}

impl AttendedListingService {
    pub fn new(
        solicitudes: Arc<dyn RequestRepository>,
        respuestas: Arc<dyn ResponseRepository>,
    ) -> Self {
        Self {
            solicitudes,
            respuestas,
        }
    }

    /// `taller = None` o `"All"` devuelve todo.
    pub async fn list(&self, taller: Option<&str>) -> AppResult<VistaAtendidas> {
        let (respondidas, instaladas) = futures::try_join!(
            self.respuestas.list_all(),
            self.solicitudes.list_by_status(EstadoSolicitud::Instalada),
        )?;

        let items: Vec<SolicitudAtendida> = respondidas
            .into_iter()
            .map(SolicitudAtendida::from)
            .chain(instaladas.into_iter().map(SolicitudAtendida::from))
            .collect();

        let talleres = filter_domain(&items);
        let seleccionado = taller
            .filter(|t| !t.is_empty())
            .unwrap_or(FILTRO_TODOS)
            .to_string();

        let mut solicitudes = filter_by_taller(items, &seleccionado);
        order_by_status(&mut solicitudes);

        debug!(
            "📋 {} atendidas para filtro '{}' ({} talleres)",
            solicitudes.len(),
            seleccionado,
            talleres.len() - 1
        );

        Ok(VistaAtendidas {
            talleres,
            taller_seleccionado: seleccionado,
            solicitudes,
        })
    }
}

/// `"All"` seguido de los talleres normalizados distintos, en orden de aparición.
pub fn filter_domain(items: &[SolicitudAtendida]) -> Vec<String> {
    let mut vistos = HashSet::from([FILTRO_TODOS.to_string()]);
    let mut talleres = vec![FILTRO_TODOS.to_string()];
    for item in items {
        let normalizado = normalize_whitespace(&item.taller);
        if vistos.insert(normalizado.clone()) {
            talleres.push(normalizado);
        }
    }
    talleres
}

/// Compara contra el valor crudo, no el normalizado.
pub fn filter_by_taller(items: Vec<SolicitudAtendida>, taller: &str) -> Vec<SolicitudAtendida> {
    if taller == FILTRO_TODOS {
        return items;
    }
    items.into_iter().filter(|item| item.taller == taller).collect()
}

/// `enviado` primero; el resto conserva el orden de entrada.
pub fn order_by_status(items: &mut [SolicitudAtendida]) {
    items.sort_by_key(|item| !item.estatus.is_enviado());
}
