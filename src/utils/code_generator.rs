use rand::Rng;

/// 6-digit numeric one-time code; leading zeros are kept.
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..=999_999))
}

/// Like `generate_six_digit_code`, but never returns `previous`.
pub fn generate_fresh_code(previous: &str) -> String {
    loop {
        let code = generate_six_digit_code();
        if code != previous {
            return code;
        }
    }
}
