use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use printpdf::{BuiltinFont, Color, Image, ImageTransform, Mm, PdfDocument};
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};
use tempfile::NamedTempFile;

use super::{CardAction, CardCapability, CompletedCard, RoastCard};
use crate::error::RoastError;

pub const EXPORT_FILE_NAME: &str = "roast-profissional.pdf";

// Card geometry, in pixels at 96 dpi
const CARD_WIDTH: u32 = 800;
const PADDING: u32 = 40;
const AVATAR_SIZE: u32 = 72;
const AVATAR_BORDER: u32 = 4;
const HEADER_GAP: u32 = 32;
const TEXT_SIZE: f32 = 18.0;
const LINE_HEIGHT: u32 = 26;
const MIN_TEXT_HEIGHT: u32 = 150;
const WRAP_COLUMNS: usize = 72;
const DPI: f32 = 96.0;

/// Longest the export waits for the avatar before drawing the placeholder.
pub const AVATAR_TIMEOUT: Duration = Duration::from_secs(15);

const GRADIENT: [[f32; 3]; 3] = [
    [79.0, 70.0, 229.0],
    [124.0, 58.0, 237.0],
    [217.0, 70.0, 239.0],
];

/// Snapshots the card into a raster, wraps it in a one-page PDF and saves it.
pub struct PdfExporter {
    client: Client,
    output_dir: PathBuf,
    avatar_timeout: Duration,
}

impl PdfExporter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            client: Client::new(),
            output_dir,
            avatar_timeout: AVATAR_TIMEOUT,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(EXPORT_FILE_NAME)
    }

    /// Download and decode the avatar. The snapshot waits for this to finish,
    /// but never longer than `avatar_timeout`.
    async fn load_avatar(&self, url: &str) -> Result<DynamicImage> {
        if url.is_empty() {
            return Err(anyhow!("card has no profile image"));
        }

        tokio::time::timeout(self.avatar_timeout, self.download_avatar(url))
            .await
            .map_err(|_| anyhow!("avatar download timed out after {:?}", self.avatar_timeout))?
    }

    async fn download_avatar(&self, url: &str) -> Result<DynamicImage> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("avatar request failed with status {}", response.status()));
        }

        let bytes = response.bytes().await?;
        Ok(image::load_from_memory(&bytes)?)
    }

    pub async fn export(&self, card: &RoastCard) -> Result<PathBuf> {
        let avatar = match self.load_avatar(&card.profile_image_url).await {
            Ok(avatar) => Some(avatar),
            Err(e) => {
                tracing::warn!("Exporting without avatar: {:#}", e);
                None
            }
        };

        let card = card.clone();
        let output_dir = self.output_dir.clone();
        tokio::task::spawn_blocking(move || {
            let pdf = render_pdf(&card, avatar.as_ref())?;
            write_atomically(&output_dir, EXPORT_FILE_NAME, &pdf)
        })
        .await
        .context("export task panicked")?
    }
}

#[async_trait]
impl CardAction for PdfExporter {
    fn capability(&self) -> CardCapability {
        CardCapability::Export
    }

    fn label(&self) -> &'static str {
        "Baixar PDF"
    }

    async fn perform(&self, card: &CompletedCard) -> Result<String, RoastError> {
        match self.export(card.card()).await {
            Ok(path) => {
                tracing::info!("Roast exported to {}", path.display());
                Ok(format!("PDF salvo em {}", path.display()))
            }
            Err(e) => {
                tracing::error!("Erro ao gerar PDF: {:#}", e);
                Err(RoastError::Export(e.to_string()))
            }
        }
    }
}

fn px_to_mm(px: f32) -> Mm {
    Mm(px * 25.4 / DPI)
}

/// Text lines of the roast, wrapped for the card width.
fn card_lines(roast: &str) -> Vec<String> {
    roast
        .lines()
        .flat_map(|line| wrap_text_to_width(&pdf_safe_text(line), WRAP_COLUMNS))
        .collect()
}

fn card_height(line_count: usize) -> u32 {
    let text_height = (line_count as u32 * LINE_HEIGHT).max(MIN_TEXT_HEIGHT);
    PADDING + AVATAR_SIZE + HEADER_GAP + text_height + PADDING
}

fn render_pdf(card: &RoastCard, avatar: Option<&DynamicImage>) -> Result<Vec<u8>> {
    let lines = card_lines(&card.roast);
    let height = card_height(lines.len());
    let raster = render_card_image(height, avatar);

    let (doc, page, layer) = PdfDocument::new(
        "Roast Profissional",
        px_to_mm(CARD_WIDTH as f32),
        px_to_mm(height as f32),
        "card",
    );
    let layer = doc.get_page(page).get_layer(layer);

    Image::from_dynamic_image(&DynamicImage::ImageRgb8(raster)).add_to_layer(
        layer.clone(),
        ImageTransform {
            dpi: Some(DPI),
            ..Default::default()
        },
    );

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("font error: {:?}", e))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("font error: {:?}", e))?;
    layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(1.0, 1.0, 1.0, None)));

    // PDF y grows upwards
    let y = |px: u32| px_to_mm(height.saturating_sub(px) as f32);
    let header_x = px_to_mm((PADDING + AVATAR_SIZE + 24) as f32);

    layer.use_text("Roast Profissional", 24.0 * 0.75, header_x, y(PADDING + 32), &bold);
    layer.use_text(
        "Baseado no seu perfil do GitHub",
        14.0 * 0.75,
        header_x,
        y(PADDING + 58),
        &regular,
    );

    let text_top = PADDING + AVATAR_SIZE + HEADER_GAP + TEXT_SIZE as u32;
    for (i, line) in lines.iter().enumerate() {
        layer.use_text(
            line.as_str(),
            TEXT_SIZE * 0.75,
            px_to_mm(PADDING as f32),
            y(text_top + i as u32 * LINE_HEIGHT),
            &regular,
        );
    }

    doc.save_to_bytes().map_err(|e| anyhow!("could not serialize PDF: {:?}", e))
}

fn gradient_at(t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0) * 2.0;
    let (from, to, local) = if t <= 1.0 {
        (GRADIENT[0], GRADIENT[1], t)
    } else {
        (GRADIENT[1], GRADIENT[2], t - 1.0)
    };
    let channel = |i: usize| (from[i] + (to[i] - from[i]) * local).round() as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

fn blend(base: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |b: u8, o: u8| (b as f32 * (1.0 - alpha) + o as f32 * alpha).round() as u8;
    Rgb([mix(base[0], over[0]), mix(base[1], over[1]), mix(base[2], over[2])])
}

/// Rasterize the card background and avatar. Text is laid over it in the PDF.
fn render_card_image(height: u32, avatar: Option<&DynamicImage>) -> RgbImage {
    let white = Rgb([255, 255, 255]);
    let mut canvas = RgbImage::from_fn(CARD_WIDTH, height, |x, y| {
        gradient_at((x as f32 / CARD_WIDTH as f32 + y as f32 / height as f32) / 2.0)
    });

    let inner = AVATAR_SIZE - 2 * AVATAR_BORDER;
    let face = avatar.map(|img| img.resize_to_fill(inner, inner, FilterType::Lanczos3).to_rgb8());

    let radius = AVATAR_SIZE as f32 / 2.0;
    let inner_radius = radius - AVATAR_BORDER as f32;
    for dy in 0..AVATAR_SIZE {
        for dx in 0..AVATAR_SIZE {
            let fx = dx as f32 + 0.5 - radius;
            let fy = dy as f32 + 0.5 - radius;
            let distance = (fx * fx + fy * fy).sqrt();
            if distance > radius {
                continue;
            }

            let (x, y) = (PADDING + dx, PADDING + dy);
            let base = *canvas.get_pixel(x, y);
            let pixel = if distance > inner_radius {
                blend(base, white, 0.8)
            } else {
                match &face {
                    Some(face) => *face.get_pixel(dx - AVATAR_BORDER, dy - AVATAR_BORDER),
                    None => blend(base, white, 0.2),
                }
            };
            canvas.put_pixel(x, y, pixel);
        }
    }

    canvas
}

/// The builtin PDF fonts only cover Latin-1; fold accents and drop the rest (emoji).
fn pdf_safe_text(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => Some('a'),
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => Some('A'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'É' | 'È' | 'Ê' | 'Ë' => Some('E'),
            'í' | 'ì' | 'î' | 'ï' => Some('i'),
            'Í' | 'Ì' | 'Î' | 'Ï' => Some('I'),
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => Some('o'),
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => Some('O'),
            'ú' | 'ù' | 'û' | 'ü' => Some('u'),
            'Ú' | 'Ù' | 'Û' | 'Ü' => Some('U'),
            'ç' => Some('c'),
            'Ç' => Some('C'),
            'ñ' => Some('n'),
            'Ñ' => Some('N'),
            '“' | '”' => Some('"'),
            '‘' | '’' => Some('\''),
            '–' | '—' => Some('-'),
            c if c.is_ascii() && !c.is_ascii_control() => Some(c),
            _ => None,
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Wrap on word boundaries; a blank input line stays a blank output line.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current_line));
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Write through a temp file in the target directory so a failed export leaves nothing behind.
fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    let path = dir.join(file_name);
    tmp.persist(&path).map_err(|e| anyhow!("could not save {}: {}", path.display(), e.error))?;
    Ok(path)
}
