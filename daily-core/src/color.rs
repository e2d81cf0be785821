use rand::Rng;

/// Uniformly random `#rrggbb` color.
pub fn random_color() -> String {
    color_from_rng(&mut rand::thread_rng())
}

pub fn color_from_rng<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))
}
