use rand::Rng;

/// Insertion pass driven by coin flips: each item keeps swapping one slot
/// left while the coin says so.
///
/// This is not a uniform permutation. An item tends to stay near where it
/// started; the last item stays last half the time regardless of length.
pub fn coin_flip_shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && rng.gen_bool(0.5) {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
