//! Python `ctypes` source rendering.
//!
//! Two files are produced per system: a bindings module holding the ordered
//! type elements, and a loader module with one class that opens the shared
//! library, declares every function signature and exposes every global.

use cbind_core::{ContainerKind, Primitive};

use crate::descriptor::FfiType;
use crate::element::{ContainerElement, ContainerField, Element};
use crate::system::{SystemBinding, SystemMethod};

const INDENT: &str = "    ";

/// Words a generated parameter name must not be. `self` is taken by the
/// method receiver.
const PYTHON_RESERVED: [&str; 36] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "self",
];

/// The `ctypes` expression for a descriptor.
pub fn ctypes_expr(ty: &FfiType) -> String {
    match ty {
        FfiType::Primitive { primitive } => primitive_expr(*primitive).to_string(),
        FfiType::Named { name } => name.clone(),
        FfiType::OpaquePointer => "ctypes.c_void_p".to_string(),
        FfiType::Pointer { of } => format!("ctypes.POINTER({})", ctypes_expr(of)),
        FfiType::Array { of, length } => format!("({} * {length})", ctypes_expr(of)),
        FfiType::Function {
            return_type,
            parameters,
        } => {
            let mut args = vec![ctypes_expr(return_type)];
            args.extend(parameters.iter().map(ctypes_expr));
            format!("ctypes.CFUNCTYPE({})", args.join(", "))
        }
    }
}

fn primitive_expr(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Void => "None",
        Primitive::Bool => "ctypes.c_bool",
        Primitive::Char => "ctypes.c_char",
        Primitive::Byte => "ctypes.c_byte",
        Primitive::UnsignedByte => "ctypes.c_ubyte",
        Primitive::Short => "ctypes.c_short",
        Primitive::UnsignedShort => "ctypes.c_ushort",
        Primitive::Int => "ctypes.c_int",
        Primitive::UnsignedInt => "ctypes.c_uint",
        Primitive::Long => "ctypes.c_long",
        Primitive::UnsignedLong => "ctypes.c_ulong",
        Primitive::LongLong => "ctypes.c_longlong",
        Primitive::UnsignedLongLong => "ctypes.c_ulonglong",
        Primitive::Int8 => "ctypes.c_int8",
        Primitive::Int16 => "ctypes.c_int16",
        Primitive::Int32 => "ctypes.c_int32",
        Primitive::Int64 => "ctypes.c_int64",
        Primitive::UInt8 => "ctypes.c_uint8",
        Primitive::UInt16 => "ctypes.c_uint16",
        Primitive::UInt32 => "ctypes.c_uint32",
        Primitive::UInt64 => "ctypes.c_uint64",
        Primitive::Float => "ctypes.c_float",
        Primitive::Double => "ctypes.c_double",
        Primitive::LongDouble => "ctypes.c_longdouble",
        Primitive::SizeT => "ctypes.c_size_t",
        Primitive::PtrDiffT => "ctypes.c_ssize_t",
    }
}

fn base_class(kind: ContainerKind) -> &'static str {
    match kind {
        ContainerKind::Struct => "ctypes.Structure",
        ContainerKind::Union => "ctypes.Union",
    }
}

fn render_header(digest: &str, text: &mut String) {
    text.push_str("# Generated by cbind. Do not edit.\n");
    text.push_str(&format!("# module digest: {digest}\n"));
}

/// Render ordered elements as a bindings module.
pub fn render_bindings(elements: &[Element], digest: &str) -> String {
    let mut text = String::new();
    render_header(digest, &mut text);
    text.push_str("import ctypes\n");
    if elements.iter().any(|e| matches!(e, Element::Enum { .. })) {
        text.push_str("from enum import IntEnum\n");
    }
    for element in elements {
        text.push('\n');
        render_element(element, &mut text);
    }
    text
}

fn render_element(element: &Element, text: &mut String) {
    match element {
        Element::Definition { name, target } => {
            text.push_str(&format!("{name} = {}\n", ctypes_expr(target)));
        }
        Element::Enum { name, entries } => {
            text.push_str(&format!("\nclass {name}(IntEnum):\n"));
            if entries.is_empty() {
                text.push_str(&format!("{INDENT}pass\n"));
            }
            for entry in entries {
                text.push_str(&format!("{INDENT}{} = {}\n", entry.name, entry.value));
            }
        }
        Element::Container(container) => {
            text.push_str(&format!(
                "\nclass {}({}):\n",
                container.name,
                base_class(container.kind)
            ));
            render_fields(&container.fields, INDENT, "_fields_", text);
        }
        Element::ContainerDeclaration { kind, name } => {
            text.push_str(&format!("\nclass {name}({}):\n", base_class(*kind)));
            text.push_str(&format!("{INDENT}pass\n"));
        }
        Element::ContainerDefinition(ContainerElement { name, fields, .. }) => {
            render_fields(fields, "", &format!("{name}._fields_"), text);
        }
    }
}

fn render_fields(fields: &[ContainerField], indent: &str, target: &str, text: &mut String) {
    if fields.is_empty() {
        text.push_str(&format!("{indent}{target} = []\n"));
        return;
    }
    text.push_str(&format!("{indent}{target} = [\n"));
    for field in fields {
        text.push_str(&format!(
            "{indent}{INDENT}(\"{}\", {}),\n",
            field.name,
            ctypes_expr(&field.ty)
        ));
    }
    text.push_str(&format!("{indent}]\n"));
}

/// Render the loader class for a system.
///
/// `bindings_module` is the import path of the module produced by
/// [`render_bindings`].
pub fn render_system(system: &SystemBinding, bindings_module: &str, digest: &str) -> String {
    let mut text = String::new();
    render_header(digest, &mut text);
    text.push_str("import ctypes\nimport os\nimport platform\n\n");
    text.push_str(&format!("from {bindings_module} import *  # noqa: F401,F403\n\n\n"));

    text.push_str(&format!("class {}:\n", system.name));
    text.push_str(&format!(
        "{INDENT}def __init__(self, model=\"{}\"):\n",
        system.binary_basename
    ));
    render_loader(&mut text);

    for method in &system.methods {
        render_signature(method, &mut text);
    }
    for field in &system.fields {
        text.push_str(&format!(
            "{INDENT}{INDENT}self.{} = {}.in_dll(self.dll, \"{}\")\n",
            field.name,
            ctypes_expr(&field.ty),
            field.name_in_library
        ));
    }

    for method in &system.methods {
        render_method(method, &mut text);
    }
    text
}

fn render_loader(text: &mut String) {
    const BODY: &str = r#"        system = platform.system()
        if system == "Linux":
            self.dll_path = os.path.abspath(f"{model}.so")
            self.dll = ctypes.cdll.LoadLibrary(self.dll_path)
        elif system == "Darwin":
            self.dll_path = os.path.abspath(f"{model}.dylib")
            self.dll = ctypes.cdll.LoadLibrary(self.dll_path)
        elif system == "Windows":
            self.dll_path = os.path.abspath(f"{model}_win64.dll")
            self.dll = ctypes.windll.LoadLibrary(self.dll_path)
        else:
            raise OSError(f"unsupported platform: {system}")

"#;
    text.push_str(BODY);
}

fn render_signature(method: &SystemMethod, text: &mut String) {
    let handle = format!("self._c_{}", method.name);
    let argtypes: Vec<_> = method
        .parameters
        .iter()
        .map(|p| ctypes_expr(&p.ty))
        .collect();
    text.push_str(&format!(
        "{INDENT}{INDENT}{handle} = getattr(self.dll, \"{}\")\n",
        method.name_in_library
    ));
    text.push_str(&format!(
        "{INDENT}{INDENT}{handle}.argtypes = [{}]\n",
        argtypes.join(", ")
    ));
    text.push_str(&format!(
        "{INDENT}{INDENT}{handle}.restype = {}\n",
        ctypes_expr(&method.return_type)
    ));
}

fn render_method(method: &SystemMethod, text: &mut String) {
    let args: Vec<String> = method
        .parameters
        .iter()
        .enumerate()
        .map(|(i, p)| match p.name.as_deref() {
            Some(name) => parameter_name(name),
            None => format!("arg{i}"),
        })
        .collect();
    let mut signature = vec!["self".to_string()];
    signature.extend(args.iter().cloned());

    text.push('\n');
    text.push_str(&format!("{INDENT}def {}({}):\n", method.name, signature.join(", ")));
    let call = format!("self._c_{}({})", method.name, args.join(", "));
    if method.return_type.is_void() {
        text.push_str(&format!("{INDENT}{INDENT}{call}\n"));
    } else {
        text.push_str(&format!("{INDENT}{INDENT}return {call}\n"));
    }
}

fn parameter_name(name: &str) -> String {
    if PYTHON_RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{SystemField, SystemParameter};
    use cbind_core::module::ResolvedEntry;

    fn node_container() -> Element {
        Element::Container(ContainerElement {
            kind: ContainerKind::Struct,
            name: "Node".into(),
            fields: vec![
                ContainerField {
                    name: "next".into(),
                    ty: FfiType::pointer(FfiType::named("Node")),
                },
                ContainerField {
                    name: "value".into(),
                    ty: FfiType::array(FfiType::primitive(Primitive::Double), 3),
                },
            ],
        })
    }

    #[test]
    fn expressions() {
        assert_eq!(ctypes_expr(&FfiType::OpaquePointer), "ctypes.c_void_p");
        assert_eq!(
            ctypes_expr(&FfiType::array(FfiType::pointer(FfiType::named("Node")), 4)),
            "(ctypes.POINTER(Node) * 4)"
        );
        assert_eq!(
            ctypes_expr(&FfiType::function(
                FfiType::primitive(Primitive::Void),
                vec![FfiType::primitive(Primitive::Int)],
            )),
            "ctypes.CFUNCTYPE(None, ctypes.c_int)"
        );
    }

    #[test]
    fn fused_container_renders_one_class() {
        let text = render_bindings(&[node_container()], "abc");
        assert!(text.contains("# module digest: abc\n"));
        assert!(text.contains(
            "class Node(ctypes.Structure):\n    _fields_ = [\n        (\"next\", ctypes.POINTER(Node)),\n        (\"value\", (ctypes.c_double * 3)),\n    ]\n"
        ));
        assert!(!text.contains("IntEnum"));
    }

    #[test]
    fn split_container_renders_in_two_places() {
        let (decl, def) = node_container().split().unwrap();
        let text = render_bindings(&[decl, def], "abc");
        let declared = text.find("class Node(ctypes.Structure):\n    pass\n").unwrap();
        let laid_out = text.find("Node._fields_ = [\n    (\"next\"").unwrap();
        assert!(declared < laid_out);
    }

    #[test]
    fn unions_and_enums() {
        let elements = vec![
            Element::Enum {
                name: "Mode".into(),
                entries: vec![
                    ResolvedEntry {
                        name: "OFF".into(),
                        value: 0,
                    },
                    ResolvedEntry {
                        name: "ON".into(),
                        value: 1,
                    },
                ],
            },
            Element::Definition {
                name: "enum_Mode".into(),
                target: FfiType::primitive(Primitive::Int),
            },
            Element::Container(ContainerElement {
                kind: ContainerKind::Union,
                name: "Value".into(),
                fields: vec![],
            }),
        ];
        let text = render_bindings(&elements, "abc");
        assert!(text.contains("from enum import IntEnum\n"));
        assert!(text.contains("class Mode(IntEnum):\n    OFF = 0\n    ON = 1\n"));
        assert!(text.contains("enum_Mode = ctypes.c_int\n"));
        assert!(text.contains("class Value(ctypes.Union):\n    _fields_ = []\n"));
    }

    #[test]
    fn loader_declares_signatures_and_globals() {
        let system = SystemBinding {
            name: "Plant".into(),
            binary_basename: "plant".into(),
            model_prefix: Some("plant".into()),
            methods: vec![
                SystemMethod {
                    name: "step".into(),
                    name_in_library: "plant_step".into(),
                    return_type: FfiType::primitive(Primitive::Void),
                    parameters: vec![SystemParameter {
                        name: Some("dt".into()),
                        ty: FfiType::primitive(Primitive::Double),
                    }],
                },
                SystemMethod {
                    name: "status".into(),
                    name_in_library: "plant_status".into(),
                    return_type: FfiType::primitive(Primitive::Int),
                    parameters: vec![SystemParameter {
                        name: None,
                        ty: FfiType::OpaquePointer,
                    }],
                },
            ],
            fields: vec![SystemField {
                name: "outputs".into(),
                name_in_library: "plant_Y".into(),
                ty: FfiType::named("ExtY_plant_T"),
            }],
            elements: vec![],
            splits: 0,
        };
        let text = render_system(&system, "plant_bindings", "abc");
        assert!(text.contains("from plant_bindings import *"));
        assert!(text.contains("class Plant:\n    def __init__(self, model=\"plant\"):\n"));
        assert!(text.contains("self._c_step = getattr(self.dll, \"plant_step\")\n"));
        assert!(text.contains("self._c_step.argtypes = [ctypes.c_double]\n"));
        assert!(text.contains("self._c_step.restype = None\n"));
        assert!(text.contains(
            "self.outputs = ExtY_plant_T.in_dll(self.dll, \"plant_Y\")\n"
        ));
        assert!(text.contains("    def step(self, dt):\n        self._c_step(dt)\n"));
        assert!(text.contains("    def status(self, arg0):\n        return self._c_status(arg0)\n"));
    }

    #[test]
    fn reserved_parameter_names_get_a_suffix() {
        let system = SystemBinding {
            name: "Io".into(),
            binary_basename: "io".into(),
            model_prefix: None,
            methods: vec![SystemMethod {
                name: "copy".into(),
                name_in_library: "copy".into(),
                return_type: FfiType::primitive(Primitive::Void),
                parameters: ["from", "in", "lambda", "self", "count"]
                    .into_iter()
                    .map(|name| SystemParameter {
                        name: Some(name.into()),
                        ty: FfiType::primitive(Primitive::Int),
                    })
                    .collect(),
            }],
            fields: vec![],
            elements: vec![],
            splits: 0,
        };
        let text = render_system(&system, "io_bindings", "abc");
        assert!(text.contains(
            "    def copy(self, from_, in_, lambda_, self_, count):\n        self._c_copy(from_, in_, lambda_, self_, count)\n"
        ));
    }
}
