//! Geo services - Prossimità tra utenti (haversine, nessun I/O)

use crate::dtos::NearbyUserDTO;
use crate::entities::User;

/// Raggio medio della Terra usato dalla formula dell'haversine
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distanza massima (inclusa) perché un utente sia considerato vicino
pub const NEARBY_RADIUS_KM: f64 = 5.0;

/// Distanza in km tra due coppie (lat, lon) espresse in gradi
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn within_radius(distance_km: f64) -> bool {
    distance_km <= NEARBY_RADIUS_KM
}

/// Arrotonda a 3 decimali
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 1000.0).round() / 1000.0
}

/// Utenti attivi entro [`NEARBY_RADIUS_KM`] dall'origine, dal più vicino.
///
/// Sono esclusi l'utente stesso, gli utenti offline e quelli senza entrambe le coordinate.
/// Se l'origine non ha coordinate il risultato è vuoto. L'ordinamento è stabile:
/// a parità di distanza arrotondata resta l'ordine di `candidates`.
pub fn nearby_users(origin: &User, candidates: &[User]) -> Vec<NearbyUserDTO> {
    let Some(origin_coords) = origin.coordinates() else {
        return Vec::new();
    };

    let mut nearby: Vec<NearbyUserDTO> = candidates
        .iter()
        .filter(|u| u.user_id != origin.user_id && u.activo)
        .filter_map(|u| {
            let distance = haversine_km(origin_coords, u.coordinates()?);
            within_radius(distance).then(|| NearbyUserDTO {
                token: u.token.clone(),
                nombre: u.nombre.clone(),
                distancia_km: round_km(distance),
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distancia_km.total_cmp(&b.distancia_km));
    nearby
}
