use crate::model::{Aspect, BodyPosition};
use crate::zodiac::{AspectKind, separation};

/// Tightest aspect between two longitudes, if any is within orb.
pub fn aspect_between(a: f64, b: f64) -> Option<(AspectKind, f64, f64)> {
    let sep = separation(a, b);

    AspectKind::all()
        .iter()
        .map(|&kind| (kind, sep, (sep - kind.angle()).abs()))
        .filter(|&(kind, _, orb)| orb <= kind.orb())
        .min_by(|x, y| x.2.total_cmp(&y.2))
}

/// All aspects between the given bodies, each pair considered once in list order.
pub fn find_aspects(bodies: &[BodyPosition]) -> Vec<Aspect> {
    let mut aspects = Vec::new();

    for (i, first) in bodies.iter().enumerate() {
        for second in &bodies[i + 1..] {
            if let Some((kind, separation, orb)) = aspect_between(first.longitude, second.longitude) {
                aspects.push(Aspect {
                    first: first.body,
                    second: second.body,
                    kind,
                    separation,
                    orb,
                });
            }
        }
    }

    aspects
}
