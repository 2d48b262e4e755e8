// Command line + construction-time settings for the config panel.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::label::LABEL_ALPHA;
use crate::types::{Point, Size};

/// Touch overlay configuration panel.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// Panel width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Panel height in pixels
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// A control as `x,y,w,h[,image.png]`; repeat for more
    #[arg(long = "label")]
    pub labels: Vec<LabelSpec>,

    /// Alpha ceiling label images are decoded with (0 = no clamp)
    #[arg(long, default_value_t = LABEL_ALPHA)]
    pub label_alpha: u8,

    /// Stacking order of the panel window; anything above 0 keeps it on top
    #[arg(long, default_value_t = 10)]
    pub z_order: i32,

    /// Accept touch (mouse) input on the panel
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub touch_sensitive: bool,
}

/// Window settings handed to the controller at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayConfig {
    pub size: Size,
    pub z_order: i32,
    pub touch_sensitive: bool,
    pub label_alpha: u8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            size: Size::new(640, 480),
            z_order: 10,
            touch_sensitive: true,
            label_alpha: LABEL_ALPHA,
        }
    }
}

impl From<&Args> for OverlayConfig {
    fn from(args: &Args) -> Self {
        Self {
            size: Size::new(args.width, args.height),
            z_order: args.z_order,
            touch_sensitive: args.touch_sensitive,
            label_alpha: args.label_alpha,
        }
    }
}

/// One `--label` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSpec {
    pub position: Point,
    pub size: Size,
    pub image: Option<PathBuf>,
}

impl FromStr for LabelSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(5, ',').map(str::trim).collect();
        if parts.len() < 4 {
            return Err(format!("expected x,y,w,h[,path], got '{s}'"));
        }
        let int = |i: usize| parts[i].parse::<i32>().map_err(|e| format!("'{}': {e}", parts[i]));
        let dim = |i: usize| parts[i].parse::<u32>().map_err(|e| format!("'{}': {e}", parts[i]));
        Ok(Self {
            position: Point::new(int(0)?, int(1)?),
            size: Size::new(dim(2)?, dim(3)?),
            image: parts.get(4).filter(|p| !p.is_empty()).map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_spec_with_and_without_image() {
        let spec: LabelSpec = "10, 20,64,32,assets/a,b.png".parse().unwrap();
        assert_eq!(spec.position, Point::new(10, 20));
        assert_eq!(spec.size, Size::new(64, 32));
        assert_eq!(spec.image, Some(PathBuf::from("assets/a,b.png")));

        let blank: LabelSpec = "0,0,8,8".parse().unwrap();
        assert_eq!(blank.image, None);
    }

    #[test]
    fn label_spec_rejects_bad_input() {
        assert!("1,2,3".parse::<LabelSpec>().is_err());
        assert!("1,2,-3,4".parse::<LabelSpec>().is_err());
    }

    #[test]
    fn args_map_onto_config() {
        let args = Args::parse_from([
            "touch-overlay",
            "--width",
            "320",
            "--label",
            "0,0,16,16",
            "--touch-sensitive",
            "false",
        ]);
        let config = OverlayConfig::from(&args);
        assert_eq!(config.size, Size::new(320, 480));
        assert!(!config.touch_sensitive);
        assert_eq!(config.z_order, 10);
        assert_eq!(args.labels.len(), 1);
    }
}
