//! Steam app-id schemes for non-Steam shortcuts.
//!
//! Steam derives a shortcut's id from a CRC32 of the executable path and the
//! shortcut name. The current client keys grid artwork on the 32-bit value;
//! Big Picture and older tooling still look artwork up under the 64-bit
//! "legacy" id, so both are computed for every import.

/// Both ids Steam may use to look up artwork for a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppIds {
    /// 32-bit id used by the current library for artwork and `shortcuts.vdf`.
    pub new: u32,
    /// 64-bit id used by Big Picture and older grid consumers.
    pub legacy: u64,
}

impl AppIds {
    pub fn for_game(exe: &str, name: &str) -> Self {
        Self {
            new: generate_new_app_id(exe, name),
            legacy: generate_app_id(exe, name),
        }
    }
}

/// Legacy 64-bit app id: `(crc32(exe + name) | 0x80000000) << 32 | 0x02000000`.
pub fn generate_app_id(exe: &str, name: &str) -> u64 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(exe.as_bytes());
    hasher.update(name.as_bytes());
    let top = hasher.finalize() | 0x8000_0000;
    (u64::from(top) << 32) | 0x0200_0000
}

/// New 32-bit app id: the upper half of the legacy id.
pub fn generate_new_app_id(exe: &str, name: &str) -> u32 {
    (generate_app_id(exe, name) >> 32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // crc32("123456789") is the CRC-32 check value 0xCBF43926
    #[test]
    fn legacy_id_from_check_value() {
        assert_eq!(generate_app_id("12345", "6789"), 0xCBF4_3926_0200_0000);
    }

    #[test]
    fn new_id_is_upper_half() {
        assert_eq!(generate_new_app_id("12345", "6789"), 0xCBF4_3926);
    }

    #[test]
    fn high_bit_is_always_set() {
        // crc32("abc") = 0x352441C2, high bit clear before masking
        let ids = AppIds::for_game("ab", "c");
        assert_eq!(ids.new, 0xB524_41C2);
        assert_eq!(ids.legacy, 0xB524_41C2_0200_0000);
        assert_eq!(ids.new, generate_new_app_id("ab", "c"));
    }

    #[test]
    fn ids_are_deterministic() {
        let a = AppIds::for_game("C:\\Games\\game.exe", "Game");
        let b = AppIds::for_game("C:\\Games\\game.exe", "Game");
        assert_eq!(a, b);
        assert_ne!(a, AppIds::for_game("C:\\Games\\game.exe", "Other"));
    }
}
