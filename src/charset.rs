// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vocabulary {
    Rust,
    Web,
    Shell,
    Mixed,
}

const RUST_TOKENS: &[&str] = &[
    "fn", "let", "mut", "impl", "trait", "struct", "enum", "match", "Some(x)", "None", "Ok(())",
    "Err(e)", "?", "=>", "->", "&mut self", "pub", "use", "mod", "async", "await", "Vec<T>",
    "Box<dyn>", "Option<T>", "Result<T, E>", "#[derive]", "'a", "unsafe", "loop", "where",
];

const WEB_TOKENS: &[&str] = &[
    "const", "let", "=>", "async", "await", "import", "export", "return", "useState()",
    "useEffect()", "<div>", "</div>", "props", "fetch()", "JSON.parse", "map()", "filter()",
    "Promise", "interface", "type", "npm run build", "{...}", "null", "undefined", "===",
];

const SHELL_TOKENS: &[&str] = &[
    "$", "ls -la", "cd ..", "grep -r", "| less", "&&", "||", "sudo", "make", "cargo build",
    "git push", "git rebase", "chmod +x", "echo $PATH", "2>&1", "> /dev/null", "tail -f",
    "ssh", "curl -s", "export", "./configure", "kill -9", "ps aux", "tar -xzf",
];

impl Vocabulary {
    pub const ALL: [Vocabulary; 4] = [
        Vocabulary::Rust,
        Vocabulary::Web,
        Vocabulary::Shell,
        Vocabulary::Mixed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Vocabulary::Rust => "rust",
            Vocabulary::Web => "web",
            Vocabulary::Shell => "shell",
            Vocabulary::Mixed => "mixed",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Vocabulary::Rust => "Rust keywords, types and punctuation",
            Vocabulary::Web => "JavaScript / JSX fragments",
            Vocabulary::Shell => "Shell commands and pipes",
            Vocabulary::Mixed => "All of the above",
        }
    }

    pub fn tokens(self) -> Vec<String> {
        let lists: &[&[&str]] = match self {
            Vocabulary::Rust => &[RUST_TOKENS],
            Vocabulary::Web => &[WEB_TOKENS],
            Vocabulary::Shell => &[SHELL_TOKENS],
            Vocabulary::Mixed => &[RUST_TOKENS, WEB_TOKENS, SHELL_TOKENS],
        };
        let mut out: Vec<String> = Vec::new();
        for token in lists.iter().flat_map(|l| l.iter()) {
            if !out.iter().any(|t| t == token) {
                out.push((*token).to_string());
            }
        }
        out
    }
}

pub fn vocabulary_from_str(spec: &str) -> Result<Vocabulary, String> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "rust" | "rs" => Ok(Vocabulary::Rust),
        "web" | "js" | "javascript" => Ok(Vocabulary::Web),
        "shell" | "sh" | "bash" => Ok(Vocabulary::Shell),
        "mixed" | "all" => Ok(Vocabulary::Mixed),
        _ => Err(format!(
            "unsupported vocabulary: {} (see --list-vocabularies)",
            spec
        )),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphSet {
    Matrix,
    Katakana,
    Binary,
    Hex,
    Ascii,
    Symbols,
    Braille,
    Runic,
}

impl GlyphSet {
    pub const ALL: [GlyphSet; 8] = [
        GlyphSet::Matrix,
        GlyphSet::Katakana,
        GlyphSet::Binary,
        GlyphSet::Hex,
        GlyphSet::Ascii,
        GlyphSet::Symbols,
        GlyphSet::Braille,
        GlyphSet::Runic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GlyphSet::Matrix => "matrix",
            GlyphSet::Katakana => "katakana",
            GlyphSet::Binary => "binary",
            GlyphSet::Hex => "hex",
            GlyphSet::Ascii => "ascii",
            GlyphSet::Symbols => "symbols",
            GlyphSet::Braille => "braille",
            GlyphSet::Runic => "runic",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            GlyphSet::Matrix => "Half-width katakana + digits",
            GlyphSet::Katakana => "Half-width katakana",
            GlyphSet::Binary => "0 and 1",
            GlyphSet::Hex => "0-9 and A-F",
            GlyphSet::Ascii => "Letters + digits + punctuation",
            GlyphSet::Symbols => "Math/technical symbols",
            GlyphSet::Braille => "Braille patterns",
            GlyphSet::Runic => "Runic",
        }
    }

    pub fn chars(self) -> String {
        let mut out = String::new();
        match self {
            GlyphSet::Matrix => {
                push_range(&mut out, 0xFF66, 0xFF9D);
                push_range(&mut out, 0x30, 0x39);
            }
            GlyphSet::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
            GlyphSet::Binary => push_range(&mut out, 0x30, 0x31),
            GlyphSet::Hex => {
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0x41, 0x46);
            }
            GlyphSet::Ascii => push_range(&mut out, 0x21, 0x7E),
            GlyphSet::Symbols => out.push_str("∞∑∫√π∆Ωµλ≈≠≤≥×÷±∂∇∈∉∩∪⊂⊃⊆⊇⊕⊗"),
            GlyphSet::Braille => push_range(&mut out, 0x2801, 0x28FF),
            GlyphSet::Runic => push_range(&mut out, 0x16A0, 0x16EA),
        }
        out
    }
}

pub fn glyph_set_from_str(spec: &str, default_to_ascii: bool) -> Result<GlyphSet, String> {
    match spec.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_to_ascii {
            GlyphSet::Ascii
        } else {
            GlyphSet::Matrix
        }),
        "matrix" => Ok(GlyphSet::Matrix),
        "katakana" => Ok(GlyphSet::Katakana),
        "bin" | "binary" | "01" => Ok(GlyphSet::Binary),
        "hex" | "hexadecimal" => Ok(GlyphSet::Hex),
        "ascii" => Ok(GlyphSet::Ascii),
        "symbols" => Ok(GlyphSet::Symbols),
        "braille" => Ok(GlyphSet::Braille),
        "runic" => Ok(GlyphSet::Runic),
        _ => Err(format!(
            "unsupported glyph set: {} (see --list-glyphs)",
            spec
        )),
    }
}

fn push_range(out: &mut String, start: u32, end: u32) {
    out.extend((start..=end).filter_map(char::from_u32));
}
