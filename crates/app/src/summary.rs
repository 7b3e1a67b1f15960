//! Terminal rendering of generated summaries.

use study_core::model::{Material, Module, Summary};

fn push_section(out: &mut Vec<String>, indent: &str, heading: &str, items: &[String], bullet: bool) {
    if items.is_empty() {
        return;
    }
    out.push(format!("{indent}{heading}"));
    if bullet {
        out.extend(items.iter().map(|item| format!("{indent}  - {item}")));
    } else {
        out.push(format!("{indent}  {}", items.join(", ")));
    }
}

fn summary_lines(summary: &Summary, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    push_section(&mut lines, indent, "Main Points", &summary.main_points, true);
    push_section(&mut lines, indent, "Topics Covered", &summary.topics, false);
    push_section(&mut lines, indent, "Key Terms", &summary.key_terms, false);
    lines
}

/// Summary of one material, or a hint when it has not been analyzed.
pub fn material_summary(material: &Material) -> String {
    match material.summary() {
        Some(summary) if !summary.is_empty() => {
            let mut lines = vec![format!("{} - Summary", material.title())];
            lines.extend(summary_lines(summary, ""));
            lines.join("\n")
        }
        _ => format!(
            "{} has no summary yet. Analyze the material first.",
            material.title()
        ),
    }
}

/// Summaries of every analyzed material of a module, in presentation order.
pub fn module_summary(module: &Module) -> String {
    let mut lines = vec![format!("{} - Module Summary", module.title())];
    let mut any = false;
    for (material, summary) in module.summaries().filter(|(_, s)| !s.is_empty()) {
        any = true;
        lines.push(String::new());
        lines.push(material.title().to_string());
        lines.extend(summary_lines(summary, "  "));
    }
    if !any {
        lines.push("No summaries yet. Analyze a material first.".into());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{GeneratedContent, MaterialId, ModuleId};
    use study_core::time::fixed_now;

    fn material(module_id: ModuleId, title: &str, summary: Option<Summary>) -> Material {
        Material::new(MaterialId::generate(), module_id, title, "PDF", fixed_now())
            .unwrap()
            .with_content(GeneratedContent {
                summary,
                ..GeneratedContent::default()
            })
    }

    fn mitosis_summary() -> Summary {
        Summary {
            main_points: vec!["Cells divide".into(), "Chromosomes split".into()],
            topics: vec!["Prophase".into(), "Anaphase".into()],
            key_terms: vec!["Spindle".into()],
        }
    }

    #[test]
    fn material_summary_lists_every_section() {
        let text = material_summary(&material(
            ModuleId::generate(),
            "Mitosis",
            Some(mitosis_summary()),
        ));
        assert_eq!(
            text,
            "Mitosis - Summary\n\
             Main Points\n  - Cells divide\n  - Chromosomes split\n\
             Topics Covered\n  Prophase, Anaphase\n\
             Key Terms\n  Spindle"
        );
    }

    #[test]
    fn unanalyzed_material_gets_a_hint() {
        let text = material_summary(&material(ModuleId::generate(), "Draft", None));
        assert_eq!(text, "Draft has no summary yet. Analyze the material first.");
    }

    #[test]
    fn module_summary_groups_by_material_in_order() {
        let id = ModuleId::generate();
        let meiosis = Summary {
            main_points: vec!["Gametes form".into()],
            ..Summary::default()
        };
        let module = Module::new(id, "Cell Biology", "", fixed_now())
            .unwrap()
            .with_materials(vec![
                material(id, "Mitosis", Some(mitosis_summary())),
                material(id, "Pending", None),
                material(id, "Meiosis", Some(meiosis)),
            ])
            .unwrap();

        let text = module_summary(&module);
        assert!(text.starts_with("Cell Biology - Module Summary\n\nMitosis\n  Main Points"));
        assert!(text.ends_with("\n\nMeiosis\n  Main Points\n    - Gametes form"));
        assert!(!text.contains("Pending"));
    }

    #[test]
    fn module_without_summaries_says_so() {
        let module = Module::new(ModuleId::generate(), "Empty", "", fixed_now()).unwrap();
        assert_eq!(
            module_summary(&module),
            "Empty - Module Summary\nNo summaries yet. Analyze a material first."
        );
    }
}
