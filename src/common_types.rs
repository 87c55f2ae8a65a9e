use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CaptureRect {
    pub fn from_points(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            x: ax.min(bx),
            y: ay.min(by),
            width: (bx - ax).abs(),
            height: (by - ay).abs(),
        }
    }

    pub fn scaled(&self, device_pixel_ratio: f64) -> Self {
        Self {
            x: self.x * device_pixel_ratio,
            y: self.y * device_pixel_ratio,
            width: self.width * device_pixel_ratio,
            height: self.height * device_pixel_ratio,
        }
    }
}

impl std::fmt::Display for CaptureRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}x{}", self.x, self.y, self.width, self.height)
    }
}

impl std::str::FromStr for CaptureRect {
    type Err = String;

    // "X,Y,WxH", e.g. "100,200,640x480"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_part = |part: Option<&str>| -> Result<f64, String> {
            part.ok_or_else(|| format!("Region '{}' should look like X,Y,WxH", s))?
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("Failed to parse region '{}': {}", s, e))
        };
        let mut parts = s.split(',');
        let x = parse_part(parts.next())?;
        let y = parse_part(parts.next())?;
        let size = parts
            .next()
            .ok_or_else(|| format!("Region '{}' should look like X,Y,WxH", s))?;
        if parts.next().is_some() {
            return Err(format!("Region '{}' has too many parts", s));
        }
        let mut size_parts = size.split('x');
        let width = parse_part(size_parts.next())?;
        let height = parse_part(size_parts.next())?;
        if size_parts.next().is_some() {
            return Err(format!("Region '{}' has too many parts", s));
        }
        Ok(CaptureRect {
            x,
            y,
            width,
            height,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    pub confidence: Option<f32>,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: Option<f32>,
    pub blocks: Vec<TextBlock>,
}

impl RecognizedText {
    pub fn new<S: AsRef<str>>(text: S, confidence: Option<f32>, blocks: Vec<TextBlock>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            confidence,
            blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parsing_round_trips_through_display() {
        let rect: CaptureRect = "100,200,640x480".parse().unwrap();
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 200.0);
        assert_eq!(rect.width, 640.0);
        assert_eq!(rect.height, 480.0);
        assert_eq!(rect.to_string().parse::<CaptureRect>().unwrap(), rect);
    }

    #[test]
    fn test_malformed_regions_are_rejected() {
        assert!("100,200".parse::<CaptureRect>().is_err());
        assert!("100,200,640".parse::<CaptureRect>().is_err());
        assert!("100,200,640x480x2".parse::<CaptureRect>().is_err());
        assert!("a,b,cxd".parse::<CaptureRect>().is_err());
    }

    #[test]
    fn test_scaling_is_exact() {
        let rect = CaptureRect {
            x: 15.0,
            y: 30.0,
            width: 200.0,
            height: 100.0,
        };
        let scaled = rect.scaled(1.5);
        assert_eq!(scaled.x, 22.5);
        assert_eq!(scaled.y, 45.0);
        assert_eq!(scaled.width, 300.0);
        assert_eq!(scaled.height, 150.0);
    }

    #[test]
    fn test_recognized_text_is_trimmed() {
        let recognized = RecognizedText::new("  Hello World  \n", None, vec![]);
        assert_eq!(recognized.text, "Hello World");
        assert!(!recognized.is_empty());
        assert!(RecognizedText::new("   ", None, vec![]).is_empty());
    }
}
