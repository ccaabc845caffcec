//! Per-character token colouring.
//!
//! `char_to_token` is indexed by the number of non-whitespace characters that
//! precede a character, not by its position in `text`. Getting this offset
//! wrong shifts every colour after the first space.

/// Per-character token membership as reported by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visualization {
    pub text: String,
    pub token_ids: Vec<i64>,
    pub tokens: Vec<String>,
    pub char_to_token: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Render a pair of spaces as one unit looked up at the current offset.
    /// Some upstream tokenizers fold double spaces into the next token.
    pub merge_double_spaces: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl Hsl {
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let h = f64::from(self.hue % 360);
        let s = f64::from(self.saturation.min(100)) / 100.0;
        let l = f64::from(self.lightness.min(100)) / 100.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;
        let (r, g, b) = match self.hue % 360 {
            0..=59 => (chroma, x, 0.0),
            60..=119 => (x, chroma, 0.0),
            120..=179 => (0.0, chroma, x),
            180..=239 => (0.0, x, chroma),
            240..=299 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

/// `(index × 37) mod 360`, so neighbouring tokens land far apart on the wheel.
pub fn token_hue(index: usize) -> u16 {
    ((index % 360) * 37 % 360) as u16
}

pub fn token_color(index: usize) -> Hsl {
    Hsl {
        hue: token_hue(index),
        saturation: 70,
        lightness: 90,
    }
}

/// Whitespace that is rendered plain and skipped by `char_to_token`.
pub fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\n'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMark {
    pub index: usize,
    pub color: Hsl,
    /// Token string, when the tokenizer reported one for this index.
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub token: Option<TokenMark>,
}

pub fn render_segments(vis: &Visualization, options: RenderOptions) -> Vec<Segment> {
    let chars: Vec<char> = vis.text.chars().collect();
    let mut segments = Vec::with_capacity(chars.len());
    let mut visible_before = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if options.merge_double_spaces && c == ' ' && chars.get(i + 1) == Some(&' ') {
            segments.push(Segment {
                text: "  ".to_string(),
                token: mark_at(vis, visible_before),
            });
            i += 2;
            continue;
        }

        if is_whitespace(c) {
            segments.push(Segment {
                text: c.to_string(),
                token: None,
            });
        } else {
            segments.push(Segment {
                text: c.to_string(),
                token: mark_at(vis, visible_before),
            });
            visible_before += 1;
        }
        i += 1;
    }

    segments
}

fn mark_at(vis: &Visualization, offset: usize) -> Option<TokenMark> {
    let index = vis.char_to_token.get(offset).copied().flatten()?;
    Some(TokenMark {
        index,
        color: token_color(index),
        token: vis.tokens.get(index).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vis(text: &str, tokens: &[&str], char_to_token: &[Option<usize>]) -> Visualization {
        Visualization {
            text: text.to_string(),
            token_ids: (0..tokens.len() as i64).collect(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            char_to_token: char_to_token.to_vec(),
        }
    }

    #[test]
    fn hue_wraps_around_the_wheel() {
        assert_eq!(token_hue(0), 0);
        assert_eq!(token_hue(1), 37);
        assert_eq!(token_hue(10), 10);
        assert_eq!(token_hue(usize::MAX), ((usize::MAX % 360) * 37 % 360) as u16);
    }

    #[test]
    fn pastel_colours_convert_to_rgb() {
        assert_eq!(token_color(0).to_rgb(), (247, 212, 212));
        assert_eq!(
            Hsl {
                hue: 120,
                saturation: 70,
                lightness: 90
            }
            .to_rgb(),
            (212, 247, 212)
        );
    }

    #[test]
    fn offsets_skip_whitespace() {
        let v = vis("ab cd", &["ab", "cd"], &[Some(0), Some(0), Some(1), Some(1)]);
        let segments = render_segments(&v, RenderOptions::default());
        let marks: Vec<Option<usize>> = segments
            .iter()
            .map(|s| s.token.as_ref().map(|t| t.index))
            .collect();
        assert_eq!(marks, vec![Some(0), Some(0), None, Some(1), Some(1)]);
        assert_eq!(segments[3].token.as_ref().unwrap().token.as_deref(), Some("cd"));
        assert_eq!(segments[3].token.as_ref().unwrap().color, token_color(1));
    }

    #[test]
    fn missing_entries_render_plain() {
        let v = vis("abc", &["a"], &[Some(0), None]);
        let segments = render_segments(&v, RenderOptions::default());
        assert!(segments[0].token.is_some());
        assert!(segments[1].token.is_none());
        assert!(segments[2].token.is_none());
    }

    #[test]
    fn out_of_range_index_keeps_its_colour() {
        let v = vis(
            "hello world",
            &["hello", "▁world"],
            &[0, 0, 0, 0, 0, 5, 5, 5, 5, 5].map(Some),
        );
        let segments = render_segments(&v, RenderOptions::default());
        assert_eq!(segments.len(), 11);

        let w = segments[6].token.as_ref().expect("mark for `w`");
        assert_eq!(w.index, 5);
        assert_eq!(w.color, token_color(5));
        assert_eq!(w.token, None);
        assert_eq!(segments[0].token.as_ref().unwrap().token.as_deref(), Some("hello"));
    }

    #[test]
    fn double_spaces_merge_only_when_asked() {
        let v = vis("a  b", &["a", "b"], &[Some(0), Some(1)]);

        let plain = render_segments(&v, RenderOptions::default());
        assert_eq!(plain.len(), 4);
        assert!(plain[1].token.is_none() && plain[2].token.is_none());

        let merged = render_segments(
            &v,
            RenderOptions {
                merge_double_spaces: true,
            },
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].text, "  ");
        assert_eq!(merged[1].token.as_ref().map(|t| t.index), Some(1));
        assert_eq!(merged[2].token.as_ref().map(|t| t.index), Some(1));
    }
}
