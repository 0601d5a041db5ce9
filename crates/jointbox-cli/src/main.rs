//! jointbox CLI - labeled joints and extrusion objects on TOML scenes.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jointbox::{
    EntityId, FaceDirection, GroupIndex, NullSink, Point3, SceneMutation, Toolkit, ToolOptions,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod report;
mod scene_file;

use report::{ExtrusionReport, GroupsReport, JointReport};
use scene_file::{LoadedScene, SceneFile};

#[derive(Parser)]
#[command(name = "jointbox")]
#[command(about = "Labeled joints and extrusion objects for box scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a labeled joint between two corners
    Joint {
        /// Scene file (.toml)
        scene: PathBuf,
        /// First corner, as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point3,
        /// Opposite corner, as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point3,
        /// Name for the new group (default: Joint)
        #[arg(short, long, default_value = "")]
        name: String,
        /// Parent group, as listed by `groups`
        #[arg(short, long)]
        parent: Option<String>,
        /// Write the updated scene here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extrude a rectangular face into a box
    Extrude {
        /// Scene file (.toml)
        scene: PathBuf,
        /// GROUP:DIRECTION (e.g. Floor:+Z), or @N for the N-th loose face
        #[arg(long)]
        face: FaceSelector,
        /// Extrusion height in the scene's display units
        #[arg(long, allow_negative_numbers = true)]
        height: f64,
        /// Name for the new group (default: Extrusion)
        #[arg(short, long, default_value = "")]
        name: String,
        /// Extrude against the face normal
        #[arg(long)]
        flip: bool,
        /// Parent group, as listed by `groups`
        #[arg(short, long)]
        parent: Option<String>,
        /// Write the updated scene here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the parent-group names of a scene
    Groups {
        /// Scene file (.toml)
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,jointbox=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Joint {
            scene,
            from,
            to,
            name,
            parent,
            output,
        } => {
            let mut loaded = SceneFile::read(&scene)?.load()?;
            let options = tool_options(name, parent, false);
            let outcome = Toolkit::new(loaded.units).create_joint(
                &mut loaded.scene,
                from,
                to,
                &options,
                &mut NullSink,
            )?;
            save(&loaded, output.as_deref())?;
            print_json(&JointReport::from(&outcome))?;
        }
        Commands::Extrude {
            scene,
            face,
            height,
            name,
            flip,
            parent,
            output,
        } => {
            let mut loaded = SceneFile::read(&scene)?.load()?;
            let selected = face.resolve(&loaded);
            if selected.is_none() {
                tracing::warn!(face = %face, "selection matched no face");
            }
            let options = tool_options(name, parent, flip);
            let outcome = Toolkit::new(loaded.units).extrude_face(
                &mut loaded.scene,
                selected,
                height,
                &options,
                &mut NullSink,
            )?;
            save(&loaded, output.as_deref())?;
            print_json(&ExtrusionReport::from(&outcome))?;
        }
        Commands::Groups { scene } => {
            let loaded = SceneFile::read(&scene)?.load()?;
            let index = GroupIndex::from_scene(&loaded.scene, None);
            print_json(&GroupsReport {
                groups: index.names().map(str::to_string).collect(),
            })?;
        }
    }

    Ok(())
}

fn tool_options(name: String, parent: Option<String>, flip_z: bool) -> ToolOptions {
    ToolOptions {
        name,
        parent_group: parent,
        flip_z,
    }
}

fn save(loaded: &LoadedScene, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        SceneFile::capture(&loaded.scene, loaded.units)?.write(path)?;
        tracing::info!(path = %path.display(), "scene written");
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_point(s: &str) -> Result<Point3, String> {
    let coords: Vec<f64> = s
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{s}'")),
    }
}

/// A face picked on the command line.
#[derive(Debug, Clone, PartialEq)]
enum FaceSelector {
    /// A face of the first group with this name.
    Group {
        name: String,
        direction: FaceDirection,
    },
    /// A loose face by position in the scene file.
    Loose(usize),
}

impl FaceSelector {
    fn resolve(&self, loaded: &LoadedScene) -> Option<EntityId> {
        match self {
            FaceSelector::Loose(index) => loaded.faces.get(*index).copied(),
            FaceSelector::Group { name, direction } => {
                let group = loaded.scene.groups().into_iter().find(|g| &g.name == name)?;
                let faces = loaded.scene.group_faces(group.id).ok()?;
                faces
                    .iter()
                    .copied()
                    .find(|&f| loaded.scene.face_direction(f).ok() == Some(*direction))
            }
        }
    }
}

impl FromStr for FaceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(index) = s.strip_prefix('@') {
            return index
                .parse()
                .map(FaceSelector::Loose)
                .map_err(|e| format!("invalid face index '{index}': {e}"));
        }
        let (name, direction) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected GROUP:DIRECTION or @N, got '{s}'"))?;
        Ok(FaceSelector::Group {
            name: name.to_string(),
            direction: direction.parse().map_err(|e| format!("{e}"))?,
        })
    }
}

impl std::fmt::Display for FaceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaceSelector::Group { name, direction } => write!(f, "{name}:{direction}"),
            FaceSelector::Loose(index) => write!(f, "@{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1, -2.5,3"), Ok(Point3::new(1.0, -2.5, 3.0)));
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,x,3").is_err());
    }

    #[test]
    fn test_face_selector() {
        assert_eq!(
            "Wall: a:-x".parse(),
            Ok(FaceSelector::Group {
                name: "Wall: a".into(),
                direction: FaceDirection::NegX
            })
        );
        assert_eq!("@2".parse(), Ok(FaceSelector::Loose(2)));
        assert!("Wall".parse::<FaceSelector>().is_err());
        assert!("Wall:up".parse::<FaceSelector>().is_err());
    }

    #[test]
    fn test_selector_resolves_group_face() {
        let file: SceneFile = toml::from_str(
            r#"
            [[groups]]
            name = "Floor"
            min = [0.0, 0.0, -1.0]
            max = [4.0, 4.0, 0.0]
            "#,
        )
        .unwrap();
        let loaded = file.load().unwrap();
        let top = FaceSelector::Group {
            name: "Floor".into(),
            direction: FaceDirection::PosZ,
        }
        .resolve(&loaded)
        .unwrap();
        assert_eq!(loaded.scene.face_direction(top), Ok(FaceDirection::PosZ));
        assert_eq!(FaceSelector::Loose(0).resolve(&loaded), None);
    }
}
