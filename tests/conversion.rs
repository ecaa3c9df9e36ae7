use ext_settings::files::{generate_file, parse_file};
use ext_settings::middleware::{apply_middleware, MiddlewareDefinition, VariantSelector, Variables};
use ext_settings::{decode, encode, generate, Config, Shape};
use serde_json::{json, Value};
use tempfile::TempDir;

fn reference_input() -> Value {
    json!({
        "ProjectFiles": {
            "HeaderPath": ["../../Inc", "../../Another/Path"]
        },
        "Groups": {
            "Doc": ["$PROJ_DIR$/../readme.txt"],
            "Lib": ["../src/main.c", "$../src/main.h"],
            "Drivers/BSP/MyRefBoard": ["C:/MyRefBoard/BSP/board_init.c", "C:/MyRefBoard/BSP/board_init.h"]
        },
        "Others": {
            "Define": ["DEFINE_PREPROCESSOR"],
            "HALModule": ["I2S", "I2C"]
        }
    })
}

#[test]
fn generates_reference_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("test_generated_input.json");
    let output = dir.path().join("test_output.ExtSettings");
    std::fs::write(&input, reference_input().to_string()).unwrap();

    generate_file(&input, &output).unwrap();

    let lines = std::fs::read_to_string(&output).unwrap();
    assert!(lines.contains("[ProjectFiles]"));
    assert!(lines.contains("HeaderPath=../../Inc;../../Another/Path"));
    assert!(lines.contains("[Groups]"));
    assert!(lines.contains("[Others]"));
    assert!(lines.contains("[Others]\nDefine=DEFINE_PREPROCESSOR;\n"));
    assert!(lines.contains("Drivers/BSP/MyRefBoard=C:/MyRefBoard/BSP/board_init.c;C:/MyRefBoard/BSP/board_init.h;\n"));
}

#[test]
fn parse_restores_generated_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.json");
    let output = dir.path().join(".extSettings");
    std::fs::write(&input, reference_input().to_string()).unwrap();

    generate_file(&input, &output).unwrap();
    let parsed = parse_file(&output).unwrap();

    assert_eq!(Value::Object(parsed), reference_input());
}

#[test]
fn split_configuration_round_trip() {
    let input = json!({
        "Cortex_M4": {
            "ProjectFiles": {"HeaderPath": ["../CM4/Inc"]},
            "Groups": {"Application/User": ["../CM4/Src/main.c"]},
            "Others": {"Define": ["CORE_CM4"]}
        },
        "Cortex_M7": {
            "ProjectFiles": {"HeaderPath": ["../CM7/Inc"]},
            "Groups": {"Application/User": ["../CM7/Src/main.c"]},
            "Others": {"Define": ["CORE_CM7"]}
        }
    });

    let text = generate(&input).unwrap();
    assert!(text.starts_with("[Cortex_M4:ProjectFiles]\nHeaderPath=../CM4/Inc\n\n"));
    assert!(text.contains("[Cortex_M7:Others]\nDefine=CORE_CM7;\n\n"));

    let config = Config::from_map(&decode(&text)).unwrap();
    assert_eq!(config.shape(), Shape::Split);
    assert_eq!(config.to_value().unwrap(), input);
    assert_eq!(encode(&config), text);
}

#[test]
fn middleware_merge_end_to_end() {
    let definition: MiddlewareDefinition = serde_json::from_value(json!({
        "name": "FreeRTOS",
        "versions": [{
            "version": "10.4.6",
            "variants": [{
                "name": "CM4F",
                "config": {
                    "ProjectFiles": {"HeaderPath": ["{root}/include", "{root}/portable/GCC/ARM_CM4F"]},
                    "Groups": {"Middlewares/FreeRTOS": ["{root}/tasks.c", "{root}/list.c"]}
                },
                "variables": {"root": {"type": "path", "default": "Middlewares/FreeRTOS"}}
            }]
        }]
    }))
    .unwrap();

    let existing = generate(&reference_input()).unwrap();
    let variables: Variables = [("root".to_string(), "Third_Party/FreeRTOS".to_string())]
        .into_iter()
        .collect();

    let merged = apply_middleware(
        &definition,
        &VariantSelector::new("CM4F").with_version("10.4.6"),
        &variables,
        Some(existing.as_str()),
    )
    .unwrap();

    let doc = Value::Object(decode(&merged));
    assert_eq!(
        doc["ProjectFiles"]["HeaderPath"],
        json!([
            "../../Inc",
            "../../Another/Path",
            "Third_Party/FreeRTOS/include",
            "Third_Party/FreeRTOS/portable/GCC/ARM_CM4F"
        ])
    );
    assert_eq!(
        doc["Groups"]["Middlewares/FreeRTOS"],
        json!(["Third_Party/FreeRTOS/tasks.c", "Third_Party/FreeRTOS/list.c"])
    );
    assert_eq!(doc["Groups"]["Doc"], json!(["$PROJ_DIR$/../readme.txt"]));
    assert_eq!(doc["Others"], reference_input()["Others"]);
}
