//! 报表渲染
//!
//! 把聚合得到的行渲染为 XLSX 工作簿或 CSV 文本。

use actix_web::HttpResponse;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::errors::{AcademicError, Result};
use crate::models::reports::requests::ExportFormat;
use crate::models::reports::responses::{
    AttendanceExportRow, CourseRoll, GradeExportRow, RosterRow, Transcript,
};

/// 单元格
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Score(Decimal),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Score(d) => d.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Score(value)
    }
}

/// 单工作表文档：标题块、表头、数据行、页脚
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub title: Vec<String>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Vec<String>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<&'static str>) -> Self {
        Self {
            name: name.into(),
            headers,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, lines: Vec<String>) -> Self {
        self.title = lines;
        self
    }

    pub fn with_footer(mut self, lines: Vec<String>) -> Self {
        self.footer = lines;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn render(&self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Xlsx => self.render_xlsx(),
            ExportFormat::Csv => self.render_csv(),
        }
    }

    fn render_csv(&self) -> Result<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(vec![]);

        for line in &self.title {
            wtr.write_record([line])?;
        }
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(Cell::as_text))?;
        }
        for line in &self.footer {
            wtr.write_record([line])?;
        }

        wtr.into_inner()
            .map_err(|e| AcademicError::export(format!("CSV 生成失败: {e}")))
    }

    fn render_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.name)?;

        let title_format = Format::new().set_bold().set_font_size(14);
        let header_format = Format::new().set_bold();
        let score_format = Format::new().set_num_format("0.00");

        let mut row: u32 = 0;
        for line in &self.title {
            worksheet.write_string_with_format(row, 0, line, &title_format)?;
            row += 1;
        }
        if !self.title.is_empty() {
            row += 1;
        }

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, *header, &header_format)?;
            worksheet.set_column_width(col as u16, 22)?;
        }
        row += 1;

        for cells in &self.rows {
            for (col, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(row, col as u16, s)?;
                    }
                    Cell::Score(d) => {
                        worksheet.write_number_with_format(
                            row,
                            col as u16,
                            d.to_f64().unwrap_or_default(),
                            &score_format,
                        )?;
                    }
                }
            }
            row += 1;
        }

        if !self.footer.is_empty() {
            row += 1;
            for line in &self.footer {
                worksheet.write_string_with_format(row, 0, line, &header_format)?;
                row += 1;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// 文件下载响应
pub fn attachment(format: ExportFormat, file_stem: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"{}.{}\"",
                sanitize_file_stem(file_stem),
                format.extension()
            ),
        ))
        .body(body)
}

/// 文件名只保留字母数字与 - _
fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn roster_sheet(course_code: &str, rows: &[RosterRow]) -> Sheet {
    let mut sheet = Sheet::new("Estudiantes", vec!["Nombre", "Código", "Email"])
        .with_title(vec![format!("Estudiantes del curso {course_code}")]);
    for r in rows {
        sheet.push_row(vec![
            r.display_name.clone().into(),
            r.student_code.clone().into(),
            r.email.clone().into(),
        ]);
    }
    sheet
}

pub fn grades_sheet(rows: &[GradeExportRow]) -> Sheet {
    let mut sheet = Sheet::new(
        "Calificaciones",
        vec!["Estudiante", "Materia", "Curso", "Nota", "Tipo", "Fecha"],
    );
    for r in rows {
        sheet.push_row(vec![
            r.student_name.clone().into(),
            r.subject_name.clone().into(),
            r.course_name.clone().into(),
            r.score.into(),
            r.kind_label.clone().into(),
            r.date.clone().into(),
        ]);
    }
    sheet
}

pub fn attendance_sheet(rows: &[AttendanceExportRow]) -> Sheet {
    let mut sheet = Sheet::new("Asistencias", vec!["Estudiante", "Materia", "Fecha", "Estado"]);
    for r in rows {
        sheet.push_row(vec![
            r.student_name.clone().into(),
            r.subject_name.clone().into(),
            r.date.clone().into(),
            r.status_label.clone().into(),
        ]);
    }
    sheet
}

pub fn transcript_sheet(transcript: &Transcript) -> Sheet {
    let code = if transcript.student_code.is_empty() {
        "N/A"
    } else {
        transcript.student_code.as_str()
    };
    let mut sheet = Sheet::new("Boletin", vec!["Materia", "Tipo", "Nota", "Fecha"])
        .with_title(vec![
            "Sistema de Gestión Académica - Boletín".to_string(),
            format!("Estudiante: {}", transcript.student_name),
            format!("Código: {code}"),
        ])
        .with_footer(vec![format!("Promedio general: {}", transcript.average)]);
    for r in &transcript.rows {
        sheet.push_row(vec![
            r.subject_name.clone().into(),
            r.kind_label.clone().into(),
            r.score.into(),
            r.date.clone().into(),
        ]);
    }
    sheet
}

pub fn roll_sheet(roll: &CourseRoll) -> Sheet {
    let mut sheet = Sheet::new("Acta", vec!["Estudiante", "Materia", "Nota", "Tipo"]).with_title(
        vec![
            format!("Acta de curso - {}", roll.course_name),
            format!("Periodo: {}", roll.academic_period),
        ],
    );
    for r in &roll.rows {
        sheet.push_row(vec![
            r.student_name.clone().into(),
            r.subject_name.clone().into(),
            r.score.into(),
            r.kind_label.clone().into(),
        ]);
    }
    sheet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reports::responses::TranscriptRow;
    use std::str::FromStr;

    fn sample_transcript() -> Transcript {
        Transcript {
            student_name: "Ana Gomez".into(),
            student_code: String::new(),
            username: "ana".into(),
            rows: vec![TranscriptRow {
                subject_name: "Algebra".into(),
                kind_label: "Final".into(),
                score: Decimal::from_str("4.50").unwrap(),
                date: "2024-03-01".into(),
            }],
            average: Decimal::from_str("4.50").unwrap(),
        }
    }

    #[test]
    fn test_transcript_csv_layout() {
        let bytes = transcript_sheet(&sample_transcript())
            .render(ExportFormat::Csv)
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Sistema de Gestión Académica - Boletín");
        assert_eq!(lines[2], "Código: N/A");
        assert_eq!(lines[3], "Materia,Tipo,Nota,Fecha");
        assert_eq!(lines[4], "Algebra,Final,4.50,2024-03-01");
        assert_eq!(lines[5], "Promedio general: 4.50");
    }

    #[test]
    fn test_xlsx_is_zip_container() {
        let bytes = grades_sheet(&[]).render(ExportFormat::Xlsx).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_attachment_headers() {
        let resp = attachment(ExportFormat::Csv, "acta MATH101", b"a,b".to_vec());
        let disposition = resp
            .headers()
            .get("Content-Disposition")
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(disposition, "attachment; filename=\"acta_MATH101.csv\"");
    }
}
