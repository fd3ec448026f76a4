use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Embedded portal dataset. Authored offline, parsed once at startup and
/// never mutated afterwards.
const CATALOG_JSON: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    pub name: String,
    // Opaque embeddable document; the shell renders it in a sandboxed frame.
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    /// Back-reference to the owning lab, used for lookup only.
    pub lab_id: String,
    pub institution: String,
    pub name: String,
    pub aim: String,
    pub theory: String,
    pub procedure: String,
    /// JSON-encoded quiz payload; decoded by the quiz widget, not here.
    pub pretest: String,
    pub posttest: String,
    pub references: String,
    pub contributors: String,
    pub faqs: Vec<Faq>,
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<Vec<Simulation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub description: String,
    pub discipline: String,
    pub target_audience: String,
    pub course_alignment: String,
    pub thumbnail: String,
    pub institution: String,
    pub institution_logo: String,
    pub experiment_count: i64,
    pub experiments: Vec<Experiment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub institution: String,
    pub lab_count: i64,
    pub labs: Vec<Lab>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    departments: Vec<Department>,
}

pub struct Catalog {
    pub departments: Vec<Department>,
    // Flattened once at load; lookups below are linear scans over these.
    pub labs: Vec<Lab>,
    pub experiments: Vec<Experiment>,
}

impl Catalog {
    pub fn load() -> anyhow::Result<Catalog> {
        let file: CatalogFile =
            serde_json::from_str(CATALOG_JSON).context("embedded catalog is invalid JSON")?;
        Ok(Catalog::from_departments(file.departments))
    }

    fn from_departments(departments: Vec<Department>) -> Catalog {
        let labs: Vec<Lab> = departments
            .iter()
            .flat_map(|dept| dept.labs.iter().cloned())
            .collect();
        let experiments: Vec<Experiment> = labs
            .iter()
            .flat_map(|lab| lab.experiments.iter().cloned())
            .collect();
        Catalog {
            departments,
            labs,
            experiments,
        }
    }

    pub fn department_by_id(&self, id: i64) -> Option<&Department> {
        self.departments.iter().find(|dept| dept.id == id)
    }

    pub fn lab_by_id(&self, id: &str) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id == id)
    }

    pub fn experiment_by_id(&self, id: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|exp| exp.id == id)
    }

    /// Labs belonging to a department. Membership is decided against the
    /// department's own nested list; Lab carries no department field.
    pub fn labs_by_department(&self, department_id: i64) -> Vec<&Lab> {
        let Some(dept) = self.department_by_id(department_id) else {
            return Vec::new();
        };
        self.labs
            .iter()
            .filter(|lab| dept.labs.iter().any(|l| l.id == lab.id))
            .collect()
    }

    pub fn experiments_by_lab(&self, lab_id: &str) -> Vec<&Experiment> {
        self.experiments
            .iter()
            .filter(|exp| exp.lab_id == lab_id)
            .collect()
    }
}
