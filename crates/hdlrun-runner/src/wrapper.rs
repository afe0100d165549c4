//! Wrapper design around an existing HDL module
//!
//! [`WrapperDesign`] instantiates a module from the HDL sources inside a new
//! toplevel. The toplevel's ports are the flattened port list: each entry is
//! declared under its emitted name and connected to the inner port carrying
//! the signal's own name. This lets a port specification rename, regroup and
//! reorder the ports of an existing module.

use crate::design::{Design, EmitError};
use hdlrun_ports::{PortEntry, PortList};
use hdlrun_sim::HdlLanguage;
use std::collections::HashMap;

/// Instance name of the wrapped module
pub const INSTANCE_NAME: &str = "inner";

/// Toplevel wrapper around an HDL module
#[derive(Debug, Clone)]
pub struct WrapperDesign {
    module: String,
    languages: Vec<HdlLanguage>,
}

impl WrapperDesign {
    /// Wrap `module`, emitting either Verilog or VHDL
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            languages: HdlLanguage::ALL.to_vec(),
        }
    }

    /// Restrict the emitted languages, in order of preference
    pub fn with_languages(mut self, languages: impl IntoIterator<Item = HdlLanguage>) -> Self {
        self.languages = languages.into_iter().collect();
        self
    }

    /// Name of the wrapped module
    pub fn module(&self) -> &str {
        &self.module
    }

    fn check_ports(&self, ports: &PortList) -> Result<(), EmitError> {
        let mut bound: HashMap<&str, &str> = HashMap::new();
        for entry in ports {
            if entry.signal.width() == 0 {
                return Err(EmitError::ZeroWidth {
                    port: entry.name.clone(),
                });
            }
            if let Some(first) = bound.insert(entry.signal.name(), &entry.name) {
                return Err(EmitError::DuplicateBinding {
                    inner: entry.signal.name().to_string(),
                    first: first.to_string(),
                    second: entry.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Design for WrapperDesign {
    fn name_hint(&self) -> &str {
        &self.module
    }

    fn languages(&self) -> &[HdlLanguage] {
        &self.languages
    }

    fn emit(
        &self,
        language: HdlLanguage,
        toplevel: &str,
        ports: &PortList,
    ) -> Result<String, EmitError> {
        if !self.can_emit(language) {
            return Err(EmitError::UnsupportedLanguage {
                design: self.module.clone(),
                language,
            });
        }
        self.check_ports(ports)?;
        Ok(match language {
            HdlLanguage::Verilog => emit_verilog(&self.module, toplevel, ports),
            HdlLanguage::Vhdl => emit_vhdl(&self.module, toplevel, ports),
        })
    }
}

fn verilog_port(entry: &PortEntry) -> String {
    let signal = &entry.signal;
    let mut decl = format!("{} wire", signal.direction().verilog_keyword());
    if signal.is_signed() {
        decl.push_str(" signed");
    }
    if signal.width() > 1 {
        decl.push_str(&format!(" [{}:0]", signal.width() - 1));
    }
    format!("{} {}", decl, entry.name)
}

fn emit_verilog(module: &str, toplevel: &str, ports: &PortList) -> String {
    let mut verilog = String::new();

    if ports.is_empty() {
        verilog.push_str(&format!("module {};\n\n", toplevel));
        verilog.push_str(&format!("    {} {} ();\n", module, INSTANCE_NAME));
    } else {
        let decls: Vec<_> = ports
            .iter()
            .map(|entry| format!("    {}", verilog_port(entry)))
            .collect();
        verilog.push_str(&format!("module {} (\n{}\n);\n\n", toplevel, decls.join(",\n")));

        let connections: Vec<_> = ports
            .iter()
            .map(|entry| format!("        .{}({})", entry.signal.name(), entry.name))
            .collect();
        verilog.push_str(&format!(
            "    {} {} (\n{}\n    );\n",
            module,
            INSTANCE_NAME,
            connections.join(",\n")
        ));
    }

    verilog.push_str("\nendmodule\n");
    verilog
}

fn vhdl_type(entry: &PortEntry) -> String {
    let signal = &entry.signal;
    let high = signal.width() - 1;
    if signal.is_signed() {
        format!("signed({} downto 0)", high)
    } else if signal.width() == 1 {
        "std_logic".to_string()
    } else {
        format!("std_logic_vector({} downto 0)", high)
    }
}

fn emit_vhdl(module: &str, toplevel: &str, ports: &PortList) -> String {
    let mut vhdl = String::from("library ieee;\nuse ieee.std_logic_1164.all;\n");
    if ports.iter().any(|entry| entry.signal.is_signed()) {
        vhdl.push_str("use ieee.numeric_std.all;\n");
    }

    vhdl.push_str(&format!("\nentity {} is\n", toplevel));
    if !ports.is_empty() {
        let decls: Vec<_> = ports
            .iter()
            .map(|entry| {
                format!(
                    "        {} : {} {}",
                    entry.name,
                    entry.signal.direction().vhdl_mode(),
                    vhdl_type(entry)
                )
            })
            .collect();
        vhdl.push_str(&format!("    port (\n{}\n    );\n", decls.join(";\n")));
    }
    vhdl.push_str(&format!("end entity {};\n\n", toplevel));

    vhdl.push_str(&format!("architecture wrapper of {} is\nbegin\n", toplevel));
    if ports.is_empty() {
        vhdl.push_str(&format!("    {} : entity work.{};\n", INSTANCE_NAME, module));
    } else {
        let connections: Vec<_> = ports
            .iter()
            .map(|entry| format!("            {} => {}", entry.signal.name(), entry.name))
            .collect();
        vhdl.push_str(&format!(
            "    {} : entity work.{}\n        port map (\n{}\n        );\n",
            INSTANCE_NAME,
            module,
            connections.join(",\n")
        ));
    }
    vhdl.push_str("end architecture wrapper;\n");
    vhdl
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlrun_ports::{flatten_ports, Direction, PortValue, Shape, Signal};

    fn adder_ports() -> PortList {
        let spec = PortValue::mapping([
            ("lhs", PortValue::from(Signal::input("a", 8))),
            ("rhs", PortValue::from(Signal::input("b", 8))),
            ("sum", PortValue::from(Signal::output("o", 9))),
        ]);
        flatten_ports(&spec).unwrap()
    }

    #[test]
    fn test_verilog_wrapper() {
        let verilog = WrapperDesign::new("adder_core")
            .emit(HdlLanguage::Verilog, "top", &adder_ports())
            .unwrap();
        assert_eq!(
            verilog,
            "module top (\n\
             \x20   input wire [7:0] lhs,\n\
             \x20   input wire [7:0] rhs,\n\
             \x20   output wire [8:0] sum\n\
             );\n\
             \n\
             \x20   adder_core inner (\n\
             \x20       .a(lhs),\n\
             \x20       .b(rhs),\n\
             \x20       .o(sum)\n\
             \x20   );\n\
             \n\
             endmodule\n"
        );
    }

    #[test]
    fn test_vhdl_wrapper() {
        let vhdl = WrapperDesign::new("adder_core")
            .emit(HdlLanguage::Vhdl, "top", &adder_ports())
            .unwrap();
        assert!(vhdl.starts_with("library ieee;\nuse ieee.std_logic_1164.all;\n\nentity top is\n"));
        assert!(vhdl.contains("        lhs : in std_logic_vector(7 downto 0);\n"));
        assert!(vhdl.contains("        sum : out std_logic_vector(8 downto 0)\n    );\n"));
        assert!(vhdl.contains("    inner : entity work.adder_core\n        port map (\n"));
        assert!(vhdl.contains("            a => lhs,\n"));
        assert!(vhdl.contains("            o => sum\n        );\n"));
        assert!(vhdl.ends_with("end architecture wrapper;\n"));
        assert!(!vhdl.contains("numeric_std"));
    }

    #[test]
    fn test_single_bit_and_signed_ports() {
        let clk = Signal::input("clk", 1);
        let delta = Signal::with_shape("delta", Shape::signed(4), Direction::Inout);
        let ports = flatten_ports(&PortValue::sequence([clk, delta])).unwrap();
        let design = WrapperDesign::new("core");

        let verilog = design.emit(HdlLanguage::Verilog, "top", &ports).unwrap();
        assert!(verilog.contains("    input wire clk,\n"));
        assert!(verilog.contains("    inout wire signed [3:0] delta\n"));

        let vhdl = design.emit(HdlLanguage::Vhdl, "top", &ports).unwrap();
        assert!(vhdl.contains("use ieee.numeric_std.all;\n"));
        assert!(vhdl.contains("clk : in std_logic;"));
        assert!(vhdl.contains("delta : inout signed(3 downto 0)"));
    }

    #[test]
    fn test_empty_port_list() {
        let design = WrapperDesign::new("core");
        let verilog = design
            .emit(HdlLanguage::Verilog, "top", &PortList::default())
            .unwrap();
        assert_eq!(verilog, "module top;\n\n    core inner ();\n\nendmodule\n");

        let vhdl = design
            .emit(HdlLanguage::Vhdl, "top", &PortList::default())
            .unwrap();
        assert!(!vhdl.contains("port ("));
        assert!(vhdl.contains("    inner : entity work.core;\n"));
    }

    #[test]
    fn test_rejects_zero_width() {
        let ports = flatten_ports(&PortValue::from(Signal::input("empty", 0))).unwrap();
        let err = WrapperDesign::new("core")
            .emit(HdlLanguage::Verilog, "top", &ports)
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::ZeroWidth {
                port: "empty".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_inner_binding() {
        let a = Signal::input("a", 1);
        let ports = flatten_ports(&PortValue::mapping([("x", &a), ("y", &a)])).unwrap();
        let err = WrapperDesign::new("core")
            .emit(HdlLanguage::Verilog, "top", &ports)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "inner port 'a' is bound by both 'x' and 'y'"
        );
    }

    #[test]
    fn test_restricted_languages() {
        let design = WrapperDesign::new("core").with_languages([HdlLanguage::Vhdl]);
        assert!(matches!(
            design.emit(HdlLanguage::Verilog, "top", &PortList::default()),
            Err(EmitError::UnsupportedLanguage {
                language: HdlLanguage::Verilog,
                ..
            })
        ));
    }
}
