use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A DIY project a learner can attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTemplate {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    pub duration: String,
    pub description: String,
    pub materials: Vec<String>,
    pub steps: Vec<String>,
    pub rating: f32,
    /// Maximum reward for each scoring component
    pub base_points: u32,
}

#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    projects: Vec<ProjectTemplate>,
}

impl ProjectCatalog {
    pub fn new(projects: Vec<ProjectTemplate>) -> Self {
        Self { projects }
    }

    pub fn get(&self, project_id: u32) -> Option<&ProjectTemplate> {
        self.projects.iter().find(|project| project.id == project_id)
    }

    pub fn list(&self) -> &[ProjectTemplate] {
        &self.projects
    }
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        Self::new(builtin_projects())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn builtin_projects() -> Vec<ProjectTemplate> {
    vec![
        ProjectTemplate {
            id: 1,
            title: "Smart Home Assistant".into(),
            difficulty: Difficulty::Intermediate,
            duration: "2-3 hours".into(),
            description: "Build your own smart home assistant that can control lights and monitor room conditions.".into(),
            materials: strings(&["Raspberry Pi", "Sensors", "LED lights", "Jumper wires", "Breadboard"]),
            steps: strings(&[
                "Set up Raspberry Pi with Raspbian OS",
                "Connect LED lights to GPIO pins",
                "Install required libraries",
                "Program voice recognition",
                "Test and calibrate sensors",
            ]),
            rating: 4.8,
            base_points: 100,
        },
        ProjectTemplate {
            id: 2,
            title: "Mini Robot".into(),
            difficulty: Difficulty::Beginner,
            duration: "1-2 hours".into(),
            description: "Create a simple robot that can move around and avoid obstacles.".into(),
            materials: strings(&["Arduino Nano", "DC Motors", "Battery pack", "Wheels", "Chassis"]),
            steps: strings(&[
                "Assemble the chassis",
                "Connect motors to motor driver",
                "Wire up the Arduino",
                "Upload movement code",
                "Test basic movements",
            ]),
            rating: 4.5,
            base_points: 75,
        },
        ProjectTemplate {
            id: 3,
            title: "AI Plant Monitor".into(),
            difficulty: Difficulty::Advanced,
            duration: "4-5 hours".into(),
            description: "Build an intelligent plant monitoring system that tracks moisture, light, and temperature.".into(),
            materials: strings(&["ESP32", "Moisture sensor", "OLED Display", "Temperature sensor", "Solar panel"]),
            steps: strings(&[
                "Set up ESP32 development environment",
                "Connect sensors to board",
                "Program monitoring logic",
                "Set up WiFi connectivity",
                "Create mobile app interface",
            ]),
            rating: 4.9,
            base_points: 150,
        },
    ]
}
