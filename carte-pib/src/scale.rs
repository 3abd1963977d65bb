//! Échelle de couleurs logarithmique pour la choroplèthe
//!
//! Le PIB s'étale sur plusieurs ordres de grandeur: le domaine est
//! transformé en log10 puis interpolé dans l'espace HSL entre les
//! deux extrémités du schéma de couleurs choisi.

use thiserror::Error;

/// Couleur neutre "pas de données" (hors gradient)
pub const NO_DATA_COLOR: Rgb = Rgb {
    r: 0xf0,
    g: 0xf0,
    b: 0xf0,
};

/// Erreurs de construction de l'échelle
#[derive(Debug, Error)]
pub enum ScaleError {
    /// Domaine invalide: le log d'une valeur non positive est indéfini.
    /// Le dataset doit être filtré avant de calculer ses statistiques.
    #[error("Invalid domain [{min}, {max}]: bounds must be > 0 for a log scale")]
    InvalidDomain { min: f64, max: f64 },
}

/// Couleur sRGB 8 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse une couleur `#RRGGBB`
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let hex = hex.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb { r, g, b })
    }

    /// Formate en `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Schémas de couleurs du rendu (extrémités du gradient)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    /// Rouge → bleu (défaut)
    #[default]
    RedBlue,
    GreenYellow,
    PurplePink,
    BlueCyan,
    OrangeRed,
    /// Rouge vif → bleu vif historique
    Classic,
}

impl ColorScheme {
    /// Extrémités (début, fin) du gradient
    pub fn endpoints(self) -> (Rgb, Rgb) {
        let (start, end) = match self {
            ColorScheme::RedBlue => ("#dc2626", "#2563eb"),
            ColorScheme::GreenYellow => ("#16a34a", "#eab308"),
            ColorScheme::PurplePink => ("#9333ea", "#ec4899"),
            ColorScheme::BlueCyan => ("#1e40af", "#06b6d4"),
            ColorScheme::OrangeRed => ("#ea580c", "#dc2626"),
            ColorScheme::Classic => ("#ff0000", "#0000ff"),
        };
        // Les littéraux ci-dessus sont valides par construction
        (
            Rgb::from_hex(start).expect("valid scheme color"),
            Rgb::from_hex(end).expect("valid scheme color"),
        )
    }

    /// Nom canonique du schéma
    pub fn name(self) -> &'static str {
        match self {
            ColorScheme::RedBlue => "red-blue",
            ColorScheme::GreenYellow => "green-yellow",
            ColorScheme::PurplePink => "purple-pink",
            ColorScheme::BlueCyan => "blue-cyan",
            ColorScheme::OrangeRed => "orange-red",
            ColorScheme::Classic => "classic",
        }
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "red-blue" => Ok(ColorScheme::RedBlue),
            "green-yellow" => Ok(ColorScheme::GreenYellow),
            "purple-pink" => Ok(ColorScheme::PurplePink),
            "blue-cyan" => Ok(ColorScheme::BlueCyan),
            "orange-red" => Ok(ColorScheme::OrangeRed),
            "classic" => Ok(ColorScheme::Classic),
            _ => Err(format!(
                "Invalid color scheme: {}. Use: red-blue, green-yellow, purple-pink, blue-cyan, orange-red, classic",
                s
            )),
        }
    }
}

/// Échelle log10 → gradient HSL, pure et déterministe pour un domaine fixé
#[derive(Debug, Clone)]
pub struct GdpScale {
    log_min: f64,
    log_max: f64,
    start: Rgb,
    end: Rgb,
    start_hsl: (f64, f64, f64),
    end_hsl: (f64, f64, f64),
}

impl GdpScale {
    /// Construit l'échelle pour un domaine `[min, max]` en valeurs brutes.
    ///
    /// # Errors
    ///
    /// `ScaleError::InvalidDomain` si `min <= 0` ou `max <= 0`.
    pub fn new(min: f64, max: f64, scheme: ColorScheme) -> Result<Self, ScaleError> {
        if !(min > 0.0) || !(max > 0.0) {
            return Err(ScaleError::InvalidDomain { min, max });
        }

        let (start, end) = scheme.endpoints();
        Ok(Self {
            log_min: min.log10(),
            log_max: max.log10(),
            start,
            end,
            start_hsl: rgb_to_hsl(start),
            end_hsl: rgb_to_hsl(end),
        })
    }

    /// Position normalisée d'une valeur dans le domaine log, clampée à [0, 1].
    ///
    /// `None` pour les valeurs sans position définie (<= 0, NaN).
    /// Domaine dégénéré (`min == max`): toutes les valeurs valides à 0.
    pub fn position(&self, value: f64) -> Option<f64> {
        if !(value > 0.0) {
            return None;
        }

        let span = self.log_max - self.log_min;
        if span <= 0.0 {
            return Some(0.0);
        }

        let t = (value.log10() - self.log_min) / span;
        Some(t.clamp(0.0, 1.0))
    }

    /// Couleur d'une valeur brute; neutre si la valeur est absente du gradient
    pub fn color(&self, value: f64) -> Rgb {
        match self.position(value) {
            Some(t) => self.color_at(t),
            None => NO_DATA_COLOR,
        }
    }

    /// Couleur d'une valeur optionnelle (année manquante → neutre)
    pub fn color_opt(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) => self.color(v),
            None => NO_DATA_COLOR,
        }
    }

    /// Couleur à la position `t` du gradient, interpolée en HSL
    pub fn color_at(&self, t: f64) -> Rgb {
        // Extrémités exactes, sans aller-retour HSL
        if t <= 0.0 {
            return self.start;
        }
        if t >= 1.0 {
            return self.end;
        }

        let (h0, s0, l0) = self.start_hsl;
        let (h1, s1, l1) = self.end_hsl;
        hsl_to_rgb(
            lerp_hue(h0, h1, t),
            s0 + (s1 - s0) * t,
            l0 + (l1 - l0) * t,
        )
    }

    /// Couleur neutre "pas de données"
    pub fn neutral(&self) -> Rgb {
        NO_DATA_COLOR
    }
}

/// RGB → HSL (h en degrés [0, 360), s et l dans [0, 1])
fn rgb_to_hsl(rgb: Rgb) -> (f64, f64, f64) {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;

    if delta == 0.0 {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    (h * 60.0, s, l)
}

/// HSL → RGB
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgb {
        r: ((r + m).clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        g: ((g + m).clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        b: ((b + m).clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
    }
}

/// Interpolation de teinte par le chemin le plus court du cercle
fn lerp_hue(a: f64, b: f64, t: f64) -> f64 {
    let mut delta = b - a;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    a + delta * t
}
