// SPDX-FileCopyrightText: © 2023 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-FileCopyrightText: © 2020 Dominik Spicher <dominikspicher@gmail.com>
// SPDX-License-Identifier: MIT

//! Minimal-style bytewords tables.
//!
//! The i-th code is the first and last letter of the i-th four-letter word
//! of the canonical bytewords list. Codes are emitted uppercase so that a
//! whole UR fits the QR alphanumeric character set; lookups are keyed on
//! the lowercased pair.

/// Byte to two-letter minimal code.
pub const MINIMALS: [&str; 256] = [
    "AE", "AD", "AO", "AX", "AA", "AH", "AM", "AT",
    "AY", "AS", "BK", "BD", "BN", "BT", "BA", "BS",
    "BE", "BY", "BG", "BW", "BB", "BZ", "CM", "CH",
    "CS", "CF", "CY", "CW", "CE", "CA", "CK", "CT",
    "CX", "CL", "CP", "CN", "DK", "DA", "DS", "DI",
    "DE", "DT", "DR", "DN", "DW", "DP", "DM", "DL",
    "DY", "EH", "EY", "EO", "EE", "EC", "EN", "EM",
    "ET", "ES", "FT", "FR", "FN", "FS", "FM", "FH",
    "FZ", "FP", "FW", "FX", "FY", "FE", "FG", "FL",
    "FD", "GA", "GE", "GR", "GS", "GT", "GL", "GW",
    "GD", "GY", "GM", "GU", "GH", "GO", "HF", "HG",
    "HD", "HK", "HT", "HP", "HH", "HL", "HY", "HE",
    "HN", "HS", "ID", "IA", "IE", "IH", "IY", "IO",
    "IS", "IN", "IM", "JE", "JZ", "JN", "JT", "JL",
    "JO", "JS", "JP", "JK", "JY", "KP", "KO", "KT",
    "KS", "KK", "KN", "KG", "KE", "KI", "KB", "LB",
    "LA", "LY", "LF", "LS", "LR", "LP", "LN", "LT",
    "LO", "LD", "LE", "LU", "LK", "LG", "MN", "MY",
    "MH", "ME", "MO", "MU", "MW", "MD", "MT", "MS",
    "MK", "NL", "NY", "ND", "NS", "NT", "NN", "NE",
    "NB", "OY", "OE", "OT", "OX", "ON", "OL", "OS",
    "PD", "PT", "PK", "PY", "PS", "PM", "PL", "PE",
    "PF", "PA", "PR", "QD", "QZ", "RE", "RP", "RL",
    "RO", "RH", "RD", "RK", "RF", "RY", "RN", "RS",
    "RT", "SE", "SA", "SR", "SS", "SK", "SW", "ST",
    "SP", "SO", "SG", "SB", "SF", "SN", "TO", "TK",
    "TI", "TT", "TD", "TE", "TY", "TL", "TB", "TS",
    "TP", "TA", "TN", "UY", "UO", "UT", "UE", "UR",
    "VT", "VY", "VO", "VL", "VE", "VW", "VA", "VD",
    "VS", "WL", "WD", "WM", "WP", "WE", "WY", "WS",
    "WT", "WN", "WZ", "WF", "WK", "YK", "YN", "YL",
    "YA", "YT", "ZS", "ZO", "ZT", "ZC", "ZE", "ZM",
];

/// Two-letter minimal code (lowercase) to byte.
pub static MINIMAL_IDXS: phf::Map<&'static str, u8> = phf::phf_map! {
    "ae" => 0x00, "ad" => 0x01, "ao" => 0x02, "ax" => 0x03,
    "aa" => 0x04, "ah" => 0x05, "am" => 0x06, "at" => 0x07,
    "ay" => 0x08, "as" => 0x09, "bk" => 0x0A, "bd" => 0x0B,
    "bn" => 0x0C, "bt" => 0x0D, "ba" => 0x0E, "bs" => 0x0F,
    "be" => 0x10, "by" => 0x11, "bg" => 0x12, "bw" => 0x13,
    "bb" => 0x14, "bz" => 0x15, "cm" => 0x16, "ch" => 0x17,
    "cs" => 0x18, "cf" => 0x19, "cy" => 0x1A, "cw" => 0x1B,
    "ce" => 0x1C, "ca" => 0x1D, "ck" => 0x1E, "ct" => 0x1F,
    "cx" => 0x20, "cl" => 0x21, "cp" => 0x22, "cn" => 0x23,
    "dk" => 0x24, "da" => 0x25, "ds" => 0x26, "di" => 0x27,
    "de" => 0x28, "dt" => 0x29, "dr" => 0x2A, "dn" => 0x2B,
    "dw" => 0x2C, "dp" => 0x2D, "dm" => 0x2E, "dl" => 0x2F,
    "dy" => 0x30, "eh" => 0x31, "ey" => 0x32, "eo" => 0x33,
    "ee" => 0x34, "ec" => 0x35, "en" => 0x36, "em" => 0x37,
    "et" => 0x38, "es" => 0x39, "ft" => 0x3A, "fr" => 0x3B,
    "fn" => 0x3C, "fs" => 0x3D, "fm" => 0x3E, "fh" => 0x3F,
    "fz" => 0x40, "fp" => 0x41, "fw" => 0x42, "fx" => 0x43,
    "fy" => 0x44, "fe" => 0x45, "fg" => 0x46, "fl" => 0x47,
    "fd" => 0x48, "ga" => 0x49, "ge" => 0x4A, "gr" => 0x4B,
    "gs" => 0x4C, "gt" => 0x4D, "gl" => 0x4E, "gw" => 0x4F,
    "gd" => 0x50, "gy" => 0x51, "gm" => 0x52, "gu" => 0x53,
    "gh" => 0x54, "go" => 0x55, "hf" => 0x56, "hg" => 0x57,
    "hd" => 0x58, "hk" => 0x59, "ht" => 0x5A, "hp" => 0x5B,
    "hh" => 0x5C, "hl" => 0x5D, "hy" => 0x5E, "he" => 0x5F,
    "hn" => 0x60, "hs" => 0x61, "id" => 0x62, "ia" => 0x63,
    "ie" => 0x64, "ih" => 0x65, "iy" => 0x66, "io" => 0x67,
    "is" => 0x68, "in" => 0x69, "im" => 0x6A, "je" => 0x6B,
    "jz" => 0x6C, "jn" => 0x6D, "jt" => 0x6E, "jl" => 0x6F,
    "jo" => 0x70, "js" => 0x71, "jp" => 0x72, "jk" => 0x73,
    "jy" => 0x74, "kp" => 0x75, "ko" => 0x76, "kt" => 0x77,
    "ks" => 0x78, "kk" => 0x79, "kn" => 0x7A, "kg" => 0x7B,
    "ke" => 0x7C, "ki" => 0x7D, "kb" => 0x7E, "lb" => 0x7F,
    "la" => 0x80, "ly" => 0x81, "lf" => 0x82, "ls" => 0x83,
    "lr" => 0x84, "lp" => 0x85, "ln" => 0x86, "lt" => 0x87,
    "lo" => 0x88, "ld" => 0x89, "le" => 0x8A, "lu" => 0x8B,
    "lk" => 0x8C, "lg" => 0x8D, "mn" => 0x8E, "my" => 0x8F,
    "mh" => 0x90, "me" => 0x91, "mo" => 0x92, "mu" => 0x93,
    "mw" => 0x94, "md" => 0x95, "mt" => 0x96, "ms" => 0x97,
    "mk" => 0x98, "nl" => 0x99, "ny" => 0x9A, "nd" => 0x9B,
    "ns" => 0x9C, "nt" => 0x9D, "nn" => 0x9E, "ne" => 0x9F,
    "nb" => 0xA0, "oy" => 0xA1, "oe" => 0xA2, "ot" => 0xA3,
    "ox" => 0xA4, "on" => 0xA5, "ol" => 0xA6, "os" => 0xA7,
    "pd" => 0xA8, "pt" => 0xA9, "pk" => 0xAA, "py" => 0xAB,
    "ps" => 0xAC, "pm" => 0xAD, "pl" => 0xAE, "pe" => 0xAF,
    "pf" => 0xB0, "pa" => 0xB1, "pr" => 0xB2, "qd" => 0xB3,
    "qz" => 0xB4, "re" => 0xB5, "rp" => 0xB6, "rl" => 0xB7,
    "ro" => 0xB8, "rh" => 0xB9, "rd" => 0xBA, "rk" => 0xBB,
    "rf" => 0xBC, "ry" => 0xBD, "rn" => 0xBE, "rs" => 0xBF,
    "rt" => 0xC0, "se" => 0xC1, "sa" => 0xC2, "sr" => 0xC3,
    "ss" => 0xC4, "sk" => 0xC5, "sw" => 0xC6, "st" => 0xC7,
    "sp" => 0xC8, "so" => 0xC9, "sg" => 0xCA, "sb" => 0xCB,
    "sf" => 0xCC, "sn" => 0xCD, "to" => 0xCE, "tk" => 0xCF,
    "ti" => 0xD0, "tt" => 0xD1, "td" => 0xD2, "te" => 0xD3,
    "ty" => 0xD4, "tl" => 0xD5, "tb" => 0xD6, "ts" => 0xD7,
    "tp" => 0xD8, "ta" => 0xD9, "tn" => 0xDA, "uy" => 0xDB,
    "uo" => 0xDC, "ut" => 0xDD, "ue" => 0xDE, "ur" => 0xDF,
    "vt" => 0xE0, "vy" => 0xE1, "vo" => 0xE2, "vl" => 0xE3,
    "ve" => 0xE4, "vw" => 0xE5, "va" => 0xE6, "vd" => 0xE7,
    "vs" => 0xE8, "wl" => 0xE9, "wd" => 0xEA, "wm" => 0xEB,
    "wp" => 0xEC, "we" => 0xED, "wy" => 0xEE, "ws" => 0xEF,
    "wt" => 0xF0, "wn" => 0xF1, "wz" => 0xF2, "wf" => 0xF3,
    "wk" => 0xF4, "yk" => 0xF5, "yn" => 0xF6, "yl" => 0xF7,
    "ya" => 0xF8, "yt" => 0xF9, "zs" => 0xFA, "zo" => 0xFB,
    "zt" => 0xFC, "zc" => 0xFD, "ze" => 0xFE, "zm" => 0xFF,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_inverses() {
        for (byte, code) in MINIMALS.iter().enumerate() {
            assert_eq!(code.len(), 2);
            assert!(code.bytes().all(|b| b.is_ascii_uppercase()));
            let key = code.to_ascii_lowercase();
            assert_eq!(MINIMAL_IDXS.get(&key).copied(), Some(byte as u8));
        }
        assert_eq!(MINIMAL_IDXS.len(), 256);
    }
}
