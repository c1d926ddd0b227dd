use blake3::Hasher;

pub fn blake3_hex(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}

/// `"Red  Shirt"` -> `"Red--Shirt"`: every single space becomes a dash.
pub fn slugify(name: &str) -> String {
    name.split(' ').collect::<Vec<_>>().join("-")
}
