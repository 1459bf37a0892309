//! Translation from SDL key symbols to the browser's `keyCode` numbers the
//! server expects.

const SDLK_SCANCODE_MASK: i32 = 1 << 30;

const fn scancode_to_keycode(scancode: i32) -> i32 {
    scancode | SDLK_SCANCODE_MASK
}

const SDLK_RIGHT: i32 = scancode_to_keycode(79);
const SDLK_LEFT: i32 = scancode_to_keycode(80);
const SDLK_DOWN: i32 = scancode_to_keycode(81);
const SDLK_UP: i32 = scancode_to_keycode(82);
const SDLK_LCTRL: i32 = scancode_to_keycode(224);
const SDLK_LSHIFT: i32 = scancode_to_keycode(225);
const SDLK_LALT: i32 = scancode_to_keycode(226);
const SDLK_RCTRL: i32 = scancode_to_keycode(228);
const SDLK_RSHIFT: i32 = scancode_to_keycode(229);
const SDLK_RALT: i32 = scancode_to_keycode(230);

/// Maps an SDL keycode (`SDL_Keycode`, i.e. `Keycode as i32`) to the DOM
/// `keyCode` of the same key. Keys without a mapping return `None`.
pub fn dom_key_code(sym: i32) -> Option<u32> {
    let code = match sym {
        // Backspace, tab, enter, escape and space share their ASCII codes.
        8 | 9 | 13 | 27 | 32 => sym as u32,
        0x30..=0x39 => sym as u32,
        0x61..=0x7a => (sym - 0x20) as u32,
        SDLK_LEFT => 37,
        SDLK_UP => 38,
        SDLK_RIGHT => 39,
        SDLK_DOWN => 40,
        SDLK_LSHIFT | SDLK_RSHIFT => 16,
        SDLK_LCTRL | SDLK_RCTRL => 17,
        SDLK_LALT | SDLK_RALT => 18,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_become_upper_case_codes() {
        assert_eq!(dom_key_code('a' as i32), Some(65));
        assert_eq!(dom_key_code('z' as i32), Some(90));
    }

    #[test]
    fn digits_and_ascii_controls_pass_through() {
        assert_eq!(dom_key_code('0' as i32), Some(48));
        assert_eq!(dom_key_code('9' as i32), Some(57));
        assert_eq!(dom_key_code(32), Some(32));
        assert_eq!(dom_key_code(13), Some(13));
        assert_eq!(dom_key_code(27), Some(27));
    }

    #[test]
    fn arrows_and_modifiers() {
        assert_eq!(dom_key_code(0x4000_0050), Some(37));
        assert_eq!(dom_key_code(0x4000_0052), Some(38));
        assert_eq!(dom_key_code(0x4000_004f), Some(39));
        assert_eq!(dom_key_code(0x4000_0051), Some(40));
        assert_eq!(dom_key_code(0x4000_00e1), Some(16));
        assert_eq!(dom_key_code(0x4000_00e4), Some(17));
    }

    #[test]
    fn unmapped_keys() {
        // F5 stays with the browser.
        assert_eq!(dom_key_code(0x4000_003e), None);
        assert_eq!(dom_key_code('A' as i32), None);
    }
}
