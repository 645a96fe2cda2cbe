//! Synthetic PDF builder shared by the integration tests and benchmarks.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One run of text drawn with a single font.
#[derive(Debug, Clone)]
pub struct Run {
    pub text: String,
    pub size: f32,
    pub bold: bool,
}

/// A line of runs drawn in one text object, starting at `(x, y)`.
#[derive(Debug, Clone)]
pub struct Line {
    pub x: f32,
    pub y: f32,
    pub runs: Vec<Run>,
}

impl Line {
    /// Line with a single regular run at `x = 72`.
    pub fn text(text: &str, size: f32, y: f32) -> Self {
        Self::at(text, size, 72.0, y)
    }

    /// Line with a single regular run at `(x, y)`.
    pub fn at(text: &str, size: f32, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            runs: vec![Run {
                text: text.to_string(),
                size,
                bold: false,
            }],
        }
    }

    /// Line with a single bold run at `x = 72`.
    pub fn bold(text: &str, size: f32, y: f32) -> Self {
        let mut line = Self::text(text, size, y);
        line.runs[0].bold = true;
        line
    }

    /// Append another run to the same line.
    pub fn then(mut self, text: &str, size: f32, bold: bool) -> Self {
        self.runs.push(Run {
            text: text.to_string(),
            size,
            bold,
        });
        self
    }
}

/// Build a PDF with one page per entry of `pages`.
pub fn build_pdf(pages: &[Vec<Line>]) -> Vec<u8> {
    build_pdf_with_info(pages, None)
}

/// Build a PDF and optionally set the Info dictionary title.
pub fn build_pdf_with_info(pages: &[Vec<Line>], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for line in lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(line.x), Object::Real(line.y)],
            ));
            for run in &line.runs {
                let font = if run.bold { "F2" } else { "F1" };
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.as_bytes().to_vec()), Object::Real(run.size)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(run.text.as_str())],
                ));
            }
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages.len() as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "CreationDate" => Object::string_literal("D:20240115103045Z"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("document serializes");
    buf
}

/// Regular body paragraph line.
pub fn body(text: &str, y: f32) -> Line {
    Line::text(text, 11.0, y)
}

/// Three-page report with a running header, page numbers, numbered
/// sections, an all-caps heading and a heading split into two runs.
pub fn sample_report() -> Vec<u8> {
    let header = |page: u32| -> Vec<Line> {
        vec![
            Line::text("CONFIDENTIAL", 9.0, 770.0),
            Line::at(&page.to_string(), 9.0, 300.0, 40.0),
        ]
    };

    let mut page1 = header(1);
    page1.extend([
        Line::bold("Annual Systems Review", 26.0, 700.0),
        body("This review covers every production system we operate", 650.0),
        body("and summarizes the incidents recorded over the year", 636.0),
        body("together with the remediation work that followed them", 622.0),
        body("and the plans agreed for the coming planning period", 608.0),
    ]);

    let mut page2 = header(2);
    page2.extend([
        Line::bold("1. Introduction", 18.0, 720.0),
        body("The introduction explains how the review was prepared", 690.0),
        body("and which teams contributed measurements to the data", 676.0),
        Line::text("1.1 Background", 14.0, 650.0),
        body("Background material describes the earlier assessments", 630.0),
        Line::text("1.1.1 Scope", 11.0, 600.0),
        body("Only systems running in the primary region are included", 580.0),
        Line::text("OVERVIEW", 11.0, 550.0),
        body("An overview of the major findings follows in this part", 530.0),
    ]);

    let mut page3 = header(3);
    page3.extend([
        Line::bold("Chapter ", 18.0, 720.0).then("2", 18.0, false),
        body("The second chapter reports results for each service area", 690.0),
        Line::text("Method Details", 18.0, 660.0),
        body("Measurements were taken weekly with the same tooling set", 640.0),
    ]);

    build_pdf(&[page1, page2, page3])
}
