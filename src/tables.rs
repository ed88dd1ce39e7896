//! Fixed lookup tables used by the pricers.
//!
//! String-keyed tables always resolve: an unknown key returns the table
//! default instead of failing.

#[derive(Debug, Clone, Copy)]
pub struct MultiplierTable {
    entries: &'static [(&'static str, f64)],
    default: f64,
}

impl MultiplierTable {
    pub const fn new(entries: &'static [(&'static str, f64)], default: f64) -> Self {
        Self { entries, default }
    }

    pub fn get(&self, key: &str) -> f64 {
        let normalized = normalize_key(key);
        self.entries
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, value)| *value)
            .unwrap_or(self.default)
    }

    pub fn contains(&self, key: &str) -> bool {
        let normalized = normalize_key(key);
        self.entries.iter().any(|(name, _)| *name == normalized)
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }
}

/// Step function over a continuous input.
///
/// `Below` tiers match the first bound the value is strictly under;
/// `Above` tiers match the first bound the value strictly exceeds.
#[derive(Debug, Clone, Copy)]
pub enum TierTable {
    Below {
        tiers: &'static [(f64, f64)],
        otherwise: f64,
    },
    Above {
        tiers: &'static [(f64, f64)],
        otherwise: f64,
    },
}

impl TierTable {
    pub fn lookup(&self, value: f64) -> f64 {
        match self {
            TierTable::Below { tiers, otherwise } => tiers
                .iter()
                .find(|(bound, _)| value < *bound)
                .map(|(_, factor)| *factor)
                .unwrap_or(*otherwise),
            TierTable::Above { tiers, otherwise } => tiers
                .iter()
                .find(|(bound, _)| value > *bound)
                .map(|(_, factor)| *factor)
                .unwrap_or(*otherwise),
        }
    }
}

/// Lowercases, folds common accents and unifies separators so that
/// `"Beauté"`, `"beaute"` and `"BEAUTE "` hit the same entry.
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|ch| match ch {
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' => 'e',
            'à' | 'â' | 'À' | 'Â' => 'a',
            'ô' | 'Ô' => 'o',
            'û' | 'ù' | 'Û' => 'u',
            'î' | 'ï' | 'Î' => 'i',
            'ç' | 'Ç' => 'c',
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

pub const NICHE_MULTIPLIERS: MultiplierTable = MultiplierTable::new(
    &[
        ("travel", 1.3),
        ("voyage", 1.3),
        ("tech", 1.2),
        ("technology", 1.2),
        ("luxury", 1.4),
        ("luxe", 1.4),
        ("finance", 1.35),
        ("beauty", 1.15),
        ("beaute", 1.15),
        ("fashion", 1.1),
        ("mode", 1.1),
        ("fitness", 1.05),
        ("sport", 1.05),
        ("parenting", 1.05),
        ("famille", 1.05),
        ("food", 1.0),
        ("cuisine", 1.0),
        ("lifestyle", 1.0),
        ("gaming", 0.95),
        ("humor", 0.9),
        ("humour", 0.9),
    ],
    1.0,
);

/// Typical engagement rate per niche; the relative-engagement tier compares
/// a creator against this.
pub const NICHE_BENCHMARKS: MultiplierTable = MultiplierTable::new(
    &[
        ("travel", 0.04),
        ("voyage", 0.04),
        ("tech", 0.025),
        ("technology", 0.025),
        ("luxury", 0.02),
        ("luxe", 0.02),
        ("finance", 0.02),
        ("beauty", 0.035),
        ("beaute", 0.035),
        ("fashion", 0.03),
        ("mode", 0.03),
        ("fitness", 0.045),
        ("sport", 0.045),
        ("parenting", 0.035),
        ("famille", 0.035),
        ("food", 0.04),
        ("cuisine", 0.04),
        ("lifestyle", 0.03),
        ("gaming", 0.05),
        ("humor", 0.06),
        ("humour", 0.06),
    ],
    0.02,
);

/// Geo factor applied to both the conversion rate and the target CPA.
pub const DESTINATION_FACTORS: MultiplierTable = MultiplierTable::new(
    &[
        ("europe_west", 1.0),
        ("western_europe", 1.0),
        ("france", 1.0),
        ("north_america", 1.3),
        ("canada", 1.3),
        ("usa", 1.4),
        ("united_states", 1.4),
        ("caribbean", 1.5),
        ("caraibes", 1.5),
        ("latam", 1.5),
        ("latin_america", 1.5),
        ("south_america", 1.5),
        ("asia", 1.7),
        ("asie", 1.7),
        ("africa", 1.6),
        ("afrique", 1.6),
        ("middle_east", 1.6),
        ("moyen_orient", 1.6),
        ("oceania", 1.8),
        ("oceanie", 1.8),
    ],
    1.2,
);

pub const AUDIENCE_TIERS: TierTable = TierTable::Below {
    tiers: &[
        (10_000.0, 0.7),
        (50_000.0, 0.8),
        (100_000.0, 0.9),
        (500_000.0, 1.0),
        (1_000_000.0, 1.2),
        (5_000_000.0, 1.5),
    ],
    otherwise: 2.0,
};

pub const RELATIVE_ENGAGEMENT_TIERS: TierTable = TierTable::Below {
    tiers: &[(0.5, 0.8), (0.8, 0.9), (1.2, 1.0), (1.5, 1.2), (2.0, 1.4)],
    otherwise: 1.5,
};

pub const SAVE_RATIO_TIERS: TierTable = TierTable::Above {
    tiers: &[(0.08, 1.3), (0.05, 1.2), (0.03, 1.1)],
    otherwise: 1.0,
};

pub const COMMENT_LIKE_TIERS: TierTable = TierTable::Above {
    tiers: &[(0.2, 1.3), (0.15, 1.2), (0.1, 1.1)],
    otherwise: 1.0,
};

/// Sample-size confidence tiers: `(minimum posts, confidence)`, highest first.
pub const CONFIDENCE_TIERS: &[(usize, f64)] = &[(10, 0.95), (5, 0.85), (3, 0.75)];
pub const CONFIDENCE_FLOOR: f64 = 0.65;
