//! # Mietwerk CLI
//!
//! Usage:
//!   mietwerk input.json -o output.json
//!   echo '{ ... }' | mietwerk --kind termination -o output.json
//!   mietwerk --example > agreement.json
//!
//! The input is a form-data record for the chosen document kind; the output
//! is the rendered page stream (draw ops per page) as JSON.

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_agreement_json());
        return;
    }

    // Document kind, defaulting to a tenancy agreement
    let kind = args
        .windows(2)
        .find(|w| w[0] == "--kind")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "agreement".to_string());

    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.json".to_string());

    let result = match kind.as_str() {
        "agreement" => mietwerk::render_agreement_json(&input),
        "termination" => mietwerk::render_termination_json(&input),
        "handover" => mietwerk::render_handover_json(&input),
        "statement" => mietwerk::render_statement_json(&input),
        other => {
            eprintln!(
                "✗ Unknown document kind '{}' (expected agreement, termination, handover or statement)",
                other
            );
            std::process::exit(2);
        }
    };

    // Render
    match result {
        Ok(document) => {
            for w in &document.warnings {
                eprintln!("⚠ {}", w.message);
            }
            let json =
                serde_json::to_string_pretty(&document).expect("Failed to serialize output");
            fs::write(&output_path, &json).expect("Failed to write output");
            eprintln!(
                "✓ Written {} pages to {}",
                document.pages.len(),
                output_path
            );
        }
        Err(e) => {
            eprintln!("✗ Failed to render document: {}", e);
            std::process::exit(1);
        }
    }
}

fn example_agreement_json() -> &'static str {
    r##"{
  "landlord": {
    "name": "Anna Ardelt",
    "street": "Lindenallee 12",
    "postalCode": "10115",
    "city": "Berlin"
  },
  "tenant": {
    "name": "Jonas Brand",
    "street": "Gartenweg 4",
    "postalCode": "50667",
    "city": "Köln"
  },
  "property": {
    "street": "Hauptstraße 1",
    "postalCode": "10115",
    "city": "Berlin",
    "unit": "2. OG links",
    "floorAreaSqm": 65.0,
    "roomCount": 2.5
  },
  "startDate": "2026-04-01",
  "rent": {
    "baseRent": 750.0,
    "utilitiesPrepayment": 180.0,
    "escalation": {
      "type": "stepped",
      "steps": [
        { "effective": "2027-04-01", "monthlyRent": 780.0 },
        { "effective": "2028-04-01", "monthlyRent": 810.0 }
      ]
    }
  },
  "deposit": 2250.0,
  "depositInInstallments": true,
  "additionalClauses": [
    "Haustiere dürfen nur mit schriftlicher Zustimmung des Vermieters gehalten werden.",
    "Schönheitsreparaturen trägt der Mieter im Rahmen der gesetzlichen Vorgaben."
  ]
}"##
}
