//! Flag tables.
//!
//! Device-directed flags occupy 224-247, network-directed flags 176-191.
//! The TNGL bytecode table is only meaningful inside a `TNGL_BYTES` payload
//! and may overlap the other two.

/// Point-to-point request/response opcodes.
///
/// Requests are `[flag][u32 request_id][body]`; responses are
/// `[flag][u32 request_id][u8 error_code][body]`.
pub mod device {
    pub const ADOPT_REQUEST: u8 = 247;
    pub const ADOPT_RESPONSE: u8 = 246;
    pub const CONFIG_READ_REQUEST: u8 = 245;
    pub const CONFIG_READ_RESPONSE: u8 = 244;
    pub const CONFIG_WRITE_REQUEST: u8 = 243;
    pub const CONFIG_WRITE_RESPONSE: u8 = 242;
    pub const TIMELINE_REQUEST: u8 = 241;
    pub const TIMELINE_RESPONSE: u8 = 240;
    pub const FINGERPRINT_REQUEST: u8 = 239;
    pub const FINGERPRINT_RESPONSE: u8 = 238;
    pub const FW_VERSION_REQUEST: u8 = 237;
    pub const FW_VERSION_RESPONSE: u8 = 236;
    pub const REBOOT_REQUEST: u8 = 235;
    pub const REBOOT_RESPONSE: u8 = 234;
    pub const DISCONNECT_REQUEST: u8 = 233;
    pub const DISCONNECT_RESPONSE: u8 = 232;
    pub const OTA_BEGIN_REQUEST: u8 = 231;
    pub const OTA_BEGIN_RESPONSE: u8 = 230;
    pub const OTA_WRITE_REQUEST: u8 = 229;
    pub const OTA_WRITE_RESPONSE: u8 = 228;
    pub const OTA_END_REQUEST: u8 = 227;
    pub const OTA_END_RESPONSE: u8 = 226;
    pub const OTA_RESET_REQUEST: u8 = 225;
    pub const OTA_RESET_RESPONSE: u8 = 224;

    /// Human-readable name for a device flag.
    pub fn name(flag: u8) -> &'static str {
        match flag {
            ADOPT_REQUEST => "ADOPT_REQUEST",
            ADOPT_RESPONSE => "ADOPT_RESPONSE",
            CONFIG_READ_REQUEST => "CONFIG_READ_REQUEST",
            CONFIG_READ_RESPONSE => "CONFIG_READ_RESPONSE",
            CONFIG_WRITE_REQUEST => "CONFIG_WRITE_REQUEST",
            CONFIG_WRITE_RESPONSE => "CONFIG_WRITE_RESPONSE",
            TIMELINE_REQUEST => "TIMELINE_REQUEST",
            TIMELINE_RESPONSE => "TIMELINE_RESPONSE",
            FINGERPRINT_REQUEST => "FINGERPRINT_REQUEST",
            FINGERPRINT_RESPONSE => "FINGERPRINT_RESPONSE",
            FW_VERSION_REQUEST => "FW_VERSION_REQUEST",
            FW_VERSION_RESPONSE => "FW_VERSION_RESPONSE",
            REBOOT_REQUEST => "REBOOT_REQUEST",
            REBOOT_RESPONSE => "REBOOT_RESPONSE",
            DISCONNECT_REQUEST => "DISCONNECT_REQUEST",
            DISCONNECT_RESPONSE => "DISCONNECT_RESPONSE",
            OTA_BEGIN_REQUEST => "OTA_BEGIN_REQUEST",
            OTA_BEGIN_RESPONSE => "OTA_BEGIN_RESPONSE",
            OTA_WRITE_REQUEST => "OTA_WRITE_REQUEST",
            OTA_WRITE_RESPONSE => "OTA_WRITE_RESPONSE",
            OTA_END_REQUEST => "OTA_END_REQUEST",
            OTA_END_RESPONSE => "OTA_END_RESPONSE",
            OTA_RESET_REQUEST => "OTA_RESET_REQUEST",
            OTA_RESET_RESPONSE => "OTA_RESET_RESPONSE",
            _ => "UNKNOWN",
        }
    }

    /// Returns true if the flag belongs to the device-directed table.
    pub fn is_device(flag: u8) -> bool {
        (OTA_RESET_RESPONSE..=ADOPT_REQUEST).contains(&flag)
    }
}

/// Broadcast/stream opcodes.
pub mod network {
    pub const CONF_BYTES: u8 = 176;
    pub const TNGL_BYTES: u8 = 177;
    pub const SET_TIMELINE: u8 = 178;
    pub const EMIT_EVENT: u8 = 179;
    pub const EMIT_LAZY_EVENT: u8 = 180;
    pub const EMIT_TIMESTAMP_EVENT: u8 = 181;
    pub const EMIT_LAZY_TIMESTAMP_EVENT: u8 = 182;
    pub const EMIT_COLOR_EVENT: u8 = 183;
    pub const EMIT_LAZY_COLOR_EVENT: u8 = 184;
    pub const EMIT_PERCENTAGE_EVENT: u8 = 185;
    pub const EMIT_LAZY_PERCENTAGE_EVENT: u8 = 186;
    pub const EMIT_LABEL_EVENT: u8 = 187;
    pub const EMIT_LAZY_LABEL_EVENT: u8 = 188;
    pub const RSSI_DATA: u8 = 189;
    pub const PEER_CONNECTED: u8 = 190;
    pub const PEER_DISCONNECTED: u8 = 191;

    /// Human-readable name for a network flag.
    pub fn name(flag: u8) -> &'static str {
        match flag {
            CONF_BYTES => "CONF_BYTES",
            TNGL_BYTES => "TNGL_BYTES",
            SET_TIMELINE => "SET_TIMELINE",
            EMIT_EVENT => "EMIT_EVENT",
            EMIT_LAZY_EVENT => "EMIT_LAZY_EVENT",
            EMIT_TIMESTAMP_EVENT => "EMIT_TIMESTAMP_EVENT",
            EMIT_LAZY_TIMESTAMP_EVENT => "EMIT_LAZY_TIMESTAMP_EVENT",
            EMIT_COLOR_EVENT => "EMIT_COLOR_EVENT",
            EMIT_LAZY_COLOR_EVENT => "EMIT_LAZY_COLOR_EVENT",
            EMIT_PERCENTAGE_EVENT => "EMIT_PERCENTAGE_EVENT",
            EMIT_LAZY_PERCENTAGE_EVENT => "EMIT_LAZY_PERCENTAGE_EVENT",
            EMIT_LABEL_EVENT => "EMIT_LABEL_EVENT",
            EMIT_LAZY_LABEL_EVENT => "EMIT_LAZY_LABEL_EVENT",
            RSSI_DATA => "RSSI_DATA",
            PEER_CONNECTED => "PEER_CONNECTED",
            PEER_DISCONNECTED => "PEER_DISCONNECTED",
            _ => "UNKNOWN",
        }
    }

    /// Returns true if the flag belongs to the network-directed table.
    pub fn is_network(flag: u8) -> bool {
        (CONF_BYTES..=PEER_DISCONNECTED).contains(&flag)
    }
}

/// TNGL bytecode tags emitted by the compiler.
pub mod tngl {
    pub const NONE: u8 = 0;

    // drawings
    pub const DRAWING_SET: u8 = 1;
    pub const DRAWING_ADD: u8 = 2;
    pub const DRAWING_SUB: u8 = 3;
    pub const DRAWING_SCALE: u8 = 4;
    pub const DRAWING_FILTER: u8 = 5;

    // windows
    pub const WINDOW_SET: u8 = 6;
    pub const WINDOW_ADD: u8 = 7;
    pub const WINDOW_SUB: u8 = 8;
    pub const WINDOW_SCALE: u8 = 9;
    pub const WINDOW_FILTER: u8 = 10;

    pub const FRAME: u8 = 11;
    pub const CLIP: u8 = 12;

    // animations
    pub const ANIMATION_NONE: u8 = 32;
    pub const ANIMATION_FILL: u8 = 33;
    pub const ANIMATION_RAINBOW: u8 = 34;
    pub const ANIMATION_FADE: u8 = 35;
    pub const ANIMATION_PROJECTILE: u8 = 36;
    pub const ANIMATION_LOADING: u8 = 37;
    pub const ANIMATION_COLOR_ROLL: u8 = 38;
    pub const ANIMATION_PALETTE_ROLL: u8 = 39;
    pub const ANIMATION_INL_ANI: u8 = 40;
    pub const ANIMATION_DEFINED: u8 = 41;

    // modifiers
    pub const MODIFIER_BRIGHTNESS: u8 = 128;
    pub const MODIFIER_TIMELINE: u8 = 129;
    pub const MODIFIER_FADE_IN: u8 = 130;
    pub const MODIFIER_FADE_OUT: u8 = 131;
    pub const MODIFIER_SWITCH_COLORS: u8 = 132;
    pub const MODIFIER_TIME_LOOP: u8 = 133;
    pub const MODIFIER_TIME_SCALE: u8 = 134;
    pub const MODIFIER_TIME_SCALE_SMOOTHED: u8 = 135;
    pub const MODIFIER_TIME_CHANGE: u8 = 136;
    pub const MODIFIER_TIME_SET: u8 = 137;

    // generators
    pub const GENERATOR_LAST_EVENT_VALUE: u8 = 144;
    pub const GENERATOR_SMOOTHOUT: u8 = 145;
    pub const GENERATOR_SINE: u8 = 146;
    pub const GENERATOR_SAW: u8 = 147;
    pub const GENERATOR_TRIANGLE: u8 = 148;
    pub const GENERATOR_SQUARE: u8 = 149;
    pub const GENERATOR_PERLIN_NOISE: u8 = 150;

    // variable operations
    pub const VARIABLE_READ: u8 = 160;
    pub const VARIABLE_ADD: u8 = 161;
    pub const VARIABLE_SUB: u8 = 162;
    pub const VARIABLE_MUL: u8 = 163;
    pub const VARIABLE_DIV: u8 = 164;
    pub const VARIABLE_MOD: u8 = 165;
    pub const VARIABLE_SCALE: u8 = 166;
    pub const VARIABLE_MAP: u8 = 167;

    // objects
    pub const DEVICE: u8 = 176;
    pub const SEGMENT: u8 = 177;
    pub const SLICE: u8 = 178;
    pub const PORT: u8 = 179;
    pub const GROUP: u8 = 180;
    pub const MARKS: u8 = 181;

    // event handling
    pub const EVENT_CATCHER: u8 = 184;
    pub const EVENT_SET_VALUE: u8 = 185;
    pub const EVENT_EMIT_LOCAL: u8 = 186;
    pub const EVENT_RANDOM_CHOICE: u8 = 187;
    pub const INTERACTIVE: u8 = 188;

    // definitions
    pub const DEFINE_DEVICE: u8 = 192;
    pub const DEFINE_SEGMENT: u8 = 193;
    pub const DEFINE_SIFTER: u8 = 194;
    pub const DEFINE_ANIMATION: u8 = 195;
    pub const DEFINE_VARIABLE: u8 = 196;
    pub const DEFINE_EMITTER: u8 = 197;

    // values
    pub const TIMESTAMP: u8 = 208;
    pub const TIMESTAMP_ZERO: u8 = 209;
    pub const TIMESTAMP_MAX: u8 = 210;
    pub const TIMESTAMP_MIN: u8 = 211;
    pub const COLOR: u8 = 212;
    pub const COLOR_WHITE: u8 = 213;
    pub const COLOR_BLACK: u8 = 214;
    pub const PERCENTAGE: u8 = 215;
    pub const LABEL: u8 = 216;
    pub const PIXELS: u8 = 217;
    pub const BOOL_TRUE: u8 = 218;
    pub const BOOL_FALSE: u8 = 219;

    pub const END_OF_STATEMENT: u8 = 254;
    pub const END_OF_TNGL_BYTES: u8 = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_are_disjoint() {
        for flag in 0..=u8::MAX {
            assert!(!(device::is_device(flag) && network::is_network(flag)));
        }
    }

    #[test]
    fn every_network_flag_in_range_is_named() {
        for flag in network::CONF_BYTES..=network::PEER_DISCONNECTED {
            assert_ne!(network::name(flag), "UNKNOWN");
        }
        assert_eq!(network::name(0), "UNKNOWN");
    }

    #[test]
    fn every_device_flag_in_range_is_named() {
        for flag in device::OTA_RESET_RESPONSE..=device::ADOPT_REQUEST {
            assert_ne!(device::name(flag), "UNKNOWN");
        }
    }
}
