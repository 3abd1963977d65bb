//! Projection Natural Earth (forward)
//!
//! Projection pseudo-cylindrique à polynômes, le rendu de référence
//! des cartes du monde. Les coefficients sont ceux de la forme "raw"
//! classique; le viewport applique l'échelle `width / 6.5` et centre
//! la carte, l'axe y pointant vers le bas (convention SVG).

/// Forme brute de la projection: (λ, φ) en radians → unités projetées
pub fn natural_earth_raw(lambda: f64, phi: f64) -> (f64, f64) {
    let phi2 = phi * phi;
    let phi4 = phi2 * phi2;

    let x = lambda
        * (0.8707 - 0.131979 * phi2
            + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4)));
    let y = phi
        * (1.007226
            + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4)));

    (x, y)
}

/// Viewport écran: projection + échelle + centrage
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    scale: f64,
    tx: f64,
    ty: f64,
}

impl Viewport {
    /// Viewport centré, échelle `width / 6.5`
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as f64;
        let height = height as f64;
        Self {
            width,
            height,
            scale: width / 6.5,
            tx: width / 2.0,
            ty: height / 2.0,
        }
    }

    /// Projette (longitude, latitude) en degrés vers les pixels écran
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = natural_earth_raw(lon.to_radians(), lat.to_radians());
        (self.tx + x * self.scale, self.ty - y * self.scale)
    }
}
