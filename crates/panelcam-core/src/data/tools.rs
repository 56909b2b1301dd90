//! Tool definitions and library management
//!
//! This module provides:
//! - Tool types and categories
//! - Tool geometry and default cutting parameters
//! - Tool library management (add, remove, lookup by diameter)
//! - The standard catalog used by the switch jobs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool types for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Flat end mill
    EndMillFlat,
    /// Ball end mill / ball nose
    EndMillBall,
    /// V-bit engraving tool
    VBit,
    /// Drill bit (twist drill)
    DrillBit,
}

impl ToolType {
    /// Whether the tool can cut sideways (profiles, pockets, helical holes)
    pub fn cuts_laterally(&self) -> bool {
        matches!(self, Self::EndMillFlat | Self::EndMillBall)
    }
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndMillFlat => write!(f, "Flat End Mill"),
            Self::EndMillBall => write!(f, "Ball End Mill"),
            Self::VBit => write!(f, "V-Bit"),
            Self::DrillBit => write!(f, "Drill Bit"),
        }
    }
}

/// Tool identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ToolId(
    /// The unique string identifier for the tool.
    pub String,
);

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tool default cutting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCuttingParams {
    /// Recommended RPM
    pub rpm: u32,
    /// Default feed rate in mm/min
    pub feed_rate: f64,
    /// Default plunge rate in mm/min
    pub plunge_rate: f64,
    /// Default stepover as percentage of diameter
    pub stepover_percent: f64,
    /// Default depth per pass in mm
    pub depth_per_pass: f64,
}

impl Default for ToolCuttingParams {
    fn default() -> Self {
        Self {
            rpm: 12000,
            feed_rate: 1500.0,
            plunge_rate: 750.0,
            stepover_percent: 50.0,
            depth_per_pass: 3.0,
        }
    }
}

/// Complete tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool identifier
    pub id: ToolId,
    /// Tool number (T word)
    pub number: u32,
    /// Display name
    pub name: String,
    /// Tool type
    pub tool_type: ToolType,
    /// Cutting diameter in mm
    pub diameter: f64,
    /// Flute length in mm
    pub flute_length: f64,
    /// Number of flutes
    pub flutes: u32,
    /// Default cutting parameters
    pub params: ToolCuttingParams,
}

impl Tool {
    /// Create a new tool with basic properties
    pub fn new(id: ToolId, number: u32, name: String, tool_type: ToolType, diameter: f64) -> Self {
        Self {
            id,
            number,
            name,
            tool_type,
            diameter,
            flute_length: (diameter * 4.0).max(3.0),
            flutes: 2,
            params: ToolCuttingParams::default(),
        }
    }

    /// Flat end mill of the given diameter, conservative parameters for small cutters
    pub fn endmill(diameter: f64) -> Self {
        let mut tool = Self::new(
            ToolId(format!("endmill_{}", diameter)),
            0,
            format!("{} mm Flat End Mill", diameter),
            ToolType::EndMillFlat,
            diameter,
        );
        tool.params.depth_per_pass = (diameter * 0.5).max(0.1);
        tool.params.feed_rate = (diameter * 400.0).clamp(200.0, 1500.0);
        tool.params.plunge_rate = tool.params.feed_rate / 2.0;
        tool
    }

    /// Cutting radius in mm
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Lateral stepover in mm
    pub fn stepover(&self) -> f64 {
        self.diameter * self.params.stepover_percent / 100.0
    }

    /// Get a descriptive string for the tool
    pub fn description_short(&self) -> String {
        format!(
            "{} - {} dia, {} flutes",
            self.name, self.diameter, self.flutes
        )
    }
}

/// Tool library - manages collection of tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolLibrary {
    /// Collection of tools by ID
    tools: HashMap<ToolId, Tool>,
    /// Next available tool number
    next_tool_number: u32,
}

impl ToolLibrary {
    /// Create a new empty tool library
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            next_tool_number: 1,
        }
    }

    /// Add a tool to the library, assigning a number when it has none
    pub fn add_tool(&mut self, mut tool: Tool) {
        if tool.number == 0 {
            tool.number = self.next_tool_number;
        }
        if tool.number >= self.next_tool_number {
            self.next_tool_number = tool.number + 1;
        }
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Get a tool by ID
    pub fn get_tool(&self, id: &ToolId) -> Option<&Tool> {
        self.tools.get(id)
    }

    /// Remove a tool from the library
    pub fn remove_tool(&mut self, id: &ToolId) -> Option<Tool> {
        self.tools.remove(id)
    }

    /// Get all tools ordered by tool number
    pub fn get_all_tools(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by_key(|t| t.number);
        tools
    }

    /// Get tools by type
    pub fn get_tools_by_type(&self, tool_type: ToolType) -> Vec<&Tool> {
        self.get_all_tools()
            .into_iter()
            .filter(|t| t.tool_type == tool_type)
            .collect()
    }

    /// Flat end mill with exactly this diameter, if catalogued
    pub fn endmill(&self, diameter: f64) -> Option<&Tool> {
        self.get_tools_by_type(ToolType::EndMillFlat)
            .into_iter()
            .find(|t| (t.diameter - diameter).abs() < 1e-6)
    }

    /// Get the next available tool number
    pub fn next_tool_number(&self) -> u32 {
        self.next_tool_number
    }

    /// Get the number of tools in the library
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if library is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the standard tool library used by the switch jobs
pub fn init_standard_library() -> ToolLibrary {
    let mut library = ToolLibrary::new();

    // 1 mm Flat End Mill, used for every switch profile
    let mut tool1 = Tool::endmill(1.0);
    tool1.id = ToolId("tool_1mm_flat".to_string());
    tool1.number = 1;
    tool1.flute_length = 4.0;
    tool1.params.rpm = 24000;
    tool1.params.feed_rate = 400.0;
    tool1.params.plunge_rate = 150.0;
    tool1.params.depth_per_pass = 0.5;
    library.add_tool(tool1);

    // 1/8" Flat End Mill
    let mut tool2 = Tool::endmill(3.175);
    tool2.id = ToolId("tool_1_8_flat".to_string());
    tool2.number = 2;
    tool2.name = "1/8\" Flat End Mill".to_string();
    tool2.flute_length = 12.0;
    tool2.params.rpm = 24000;
    tool2.params.feed_rate = 1000.0;
    tool2.params.plunge_rate = 300.0;
    tool2.params.depth_per_pass = 1.5;
    library.add_tool(tool2);

    library
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library() {
        let library = init_standard_library();
        assert_eq!(library.len(), 2);
        assert_eq!(library.next_tool_number(), 3);

        let one_mm = library.endmill(1.0).expect("1 mm end mill");
        assert_eq!(one_mm.number, 1);
        assert_eq!(one_mm.radius(), 0.5);
        assert!(library.endmill(6.0).is_none());
    }

    #[test]
    fn test_add_tool_assigns_number() {
        let mut library = ToolLibrary::new();
        library.add_tool(Tool::endmill(2.0));
        library.add_tool(Tool::endmill(4.0));
        let numbers: Vec<u32> = library.get_all_tools().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(library.endmill(4.0).map(|t| t.number), Some(2));
    }

    #[test]
    fn test_stepover() {
        let mut tool = Tool::endmill(3.0);
        tool.params.stepover_percent = 40.0;
        assert!((tool.stepover() - 1.2).abs() < 1e-12);
        assert!(ToolType::EndMillFlat.cuts_laterally());
        assert!(!ToolType::DrillBit.cuts_laterally());
    }
}
