//! Décodage des arcs (delta-encoding + transform de quantification)

use geo::Coord;

use crate::types::Transform;
use crate::TopoError;

/// Décode la table d'arcs du document en coordonnées absolues.
///
/// Avec un transform, chaque position est un delta entier cumulé:
/// `x = somme(dx) * scale[0] + translate[0]`. Sans transform, les
/// positions sont déjà absolues et passées telles quelles.
pub fn decode(raw: &[Vec<Vec<f64>>], transform: Option<&Transform>) -> Result<Vec<Vec<Coord>>, TopoError> {
    raw.iter()
        .enumerate()
        .map(|(index, arc)| decode_arc(index, arc, transform))
        .collect()
}

fn decode_arc(
    index: usize,
    arc: &[Vec<f64>],
    transform: Option<&Transform>,
) -> Result<Vec<Coord>, TopoError> {
    if arc.len() < 2 {
        return Err(TopoError::malformed_arc(
            index,
            format!("expected at least 2 positions, got {}", arc.len()),
        ));
    }

    let mut coords = Vec::with_capacity(arc.len());

    match transform {
        Some(t) => {
            // Deltas cumulés sur des entiers quantifiés
            let mut x = 0.0;
            let mut y = 0.0;
            for (i, position) in arc.iter().enumerate() {
                let (dx, dy) = components(index, i, position)?;
                x += dx;
                y += dy;
                coords.push(Coord {
                    x: x * t.scale[0] + t.translate[0],
                    y: y * t.scale[1] + t.translate[1],
                });
            }
        }
        None => {
            for (i, position) in arc.iter().enumerate() {
                let (x, y) = components(index, i, position)?;
                coords.push(Coord { x, y });
            }
        }
    }

    Ok(coords)
}

/// Extrait (x, y) d'une position, les composantes surnuméraires
/// (z, m) sont ignorées
fn components(arc: usize, position: usize, values: &[f64]) -> Result<(f64, f64), TopoError> {
    if values.len() < 2 {
        return Err(TopoError::malformed_arc(
            arc,
            format!("position {} has {} component(s)", position, values.len()),
        ));
    }
    Ok((values[0], values[1]))
}
